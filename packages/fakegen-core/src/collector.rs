//! C11: the standalone collector task. After a source-set's generated fakes
//! land in a build-local scratch directory, this walks that directory and
//! copies each emitted file into the consumer source set whose *name* the
//! package's dot-segments match -- spec.md §4.9 steps 3-4: for each segment,
//! find candidate source-set names that begin with that segment
//! (case-insensitive) and end in "Main"; among all such matches, the
//! shortest name wins (`iosMain` beats `iosX64Main`). Falls back to the
//! common source set when nothing matches.

use std::path::{Path, PathBuf};

use crate::error::{GenError, GenResult};

/// One candidate destination: a consumer source-set name and its
/// generated-code root directory.
#[derive(Debug, Clone)]
pub struct SourceSetTarget {
    pub name: String,
    pub directory: PathBuf,
}

/// Reads only as much of a file as it takes to find the `package` line --
/// spec.md bounds this at the first 10 lines so a collector pass stays
/// cheap even over thousands of emitted files.
pub fn read_package_declaration(path: &Path) -> GenResult<Option<String>> {
    let contents = std::fs::read_to_string(path).map_err(|source| GenError::CollectorIo { path: path.display().to_string(), source })?;
    Ok(contents.lines().take(10).find_map(extract_package))
}

fn extract_package(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("package")?;
    let rest = rest.trim_start();
    let rest = rest.strip_suffix(';').unwrap_or(rest);
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

fn segments(package: &str) -> Vec<&str> {
    package.split('.').filter(|s| !s.is_empty()).collect()
}

fn is_main_suffixed(name: &str) -> bool {
    name.to_lowercase().ends_with("main")
}

/// For each of `package`'s dot-segments, a candidate matches if its name
/// begins with that segment (case-insensitive) and ends in "Main". Among
/// every candidate that matches any segment, the shortest name wins --
/// e.g. `iosMain` beats `iosX64Main` for a package segment `ios` that both
/// match, since the shorter name is the more general source set.
pub fn pick_target<'a>(package: &str, candidates: &'a [SourceSetTarget], fallback: Option<&'a SourceSetTarget>) -> Option<&'a SourceSetTarget> {
    let pkg_segments = segments(package);
    let mut best: Option<&SourceSetTarget> = None;
    for segment in &pkg_segments {
        let segment_lower = segment.to_lowercase();
        for candidate in candidates {
            let name_lower = candidate.name.to_lowercase();
            if !is_main_suffixed(&candidate.name) || !name_lower.starts_with(&segment_lower) {
                continue;
            }
            match best {
                None => best = Some(candidate),
                Some(current) if candidate.name.len() < current.name.len() => best = Some(candidate),
                _ => {}
            }
        }
    }
    best.or(fallback)
}

/// One collector run over a scratch directory of freshly-emitted files.
/// Idempotent: copying the same source twice over the same destination
/// produces byte-identical output, so re-running after a partial failure
/// is always safe.
pub fn collect(
    scratch_dir: &Path,
    candidates: &[SourceSetTarget],
    fallback: Option<&SourceSetTarget>,
) -> GenResult<Vec<PathBuf>> {
    let mut copied = Vec::new();
    let entries = std::fs::read_dir(scratch_dir).map_err(|source| GenError::CollectorIo { path: scratch_dir.display().to_string(), source })?;
    for entry in entries {
        let entry = entry.map_err(|source| GenError::CollectorIo { path: scratch_dir.display().to_string(), source })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("kt") {
            continue;
        }
        let Some(package) = read_package_declaration(&path)? else { continue };
        let Some(target) = pick_target(&package, candidates, fallback) else { continue };
        let file_name = path.file_name().expect("read_dir entries always have a file name");
        let dest = target.directory.join(file_name);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| GenError::CollectorIo { path: parent.display().to_string(), source })?;
        }
        std::fs::copy(&path, &dest).map_err(|source| GenError::CollectorIo { path: dest.display().to_string(), source })?;
        copied.push(dest);
    }
    copied.sort();
    Ok(copied)
}
