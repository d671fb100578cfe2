//! C12: extension variant wiring. Not a build-system integration (that is
//! explicitly out of scope, per spec.md §1/§6) but the data this crate must
//! hand to one: the attributes a producing unit's fakes-variant publishes,
//! and the capability string a consumer selects it by.

use serde::{Deserialize, Serialize};

/// `<group>:<name>-fakes:<version>` -- unique per producing unit so a
/// consumer can depend on exactly this unit's generated fakes without
/// pulling in its main artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl Capability {
    pub fn new(group: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Capability { group: group.into(), name: name.into(), version: version.into() }
    }

    /// The `-fakes` suffix on `name` is the whole point: it distinguishes
    /// this capability from the unit's main-artifact capability, which
    /// otherwise shares the same group/version.
    pub fn coordinates(&self) -> String {
        format!("{}:{}-fakes:{}", self.group, self.name, self.version)
    }
}

/// A single build-system attribute the variant carries, mirrored 1:1 from
/// the unit's main API variant (spec.md §6: "attributes exactly mirror its
/// main API variant"). Kept as an opaque key/value pair since attribute
/// vocabularies are build-system-specific and out of this crate's scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAttribute {
    pub key: String,
    pub value: String,
}

/// The consumable dependency variant a producing unit publishes once fake
/// synthesis has run: the emitted files under `artifact_dir`, tagged with
/// `capability` and the mirrored `attributes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakesVariant {
    pub capability: Capability,
    pub attributes: Vec<VariantAttribute>,
    pub artifact_dir: String,
}

impl FakesVariant {
    /// Builds a fakes-variant description from the main variant's own
    /// attributes and identity -- the mirroring spec.md requires, plus the
    /// unique capability that separates the two variants.
    pub fn mirroring(group: &str, name: &str, version: &str, main_attributes: &[VariantAttribute], artifact_dir: impl Into<String>) -> Self {
        FakesVariant {
            capability: Capability::new(group, name, version),
            attributes: main_attributes.to_vec(),
            artifact_dir: artifact_dir.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_coordinates_carry_the_fakes_suffix() {
        let cap = Capability::new("com.example", "widgets", "1.2.3");
        assert_eq!(cap.coordinates(), "com.example:widgets-fakes:1.2.3");
    }

    #[test]
    fn mirroring_copies_main_attributes_verbatim() {
        let main_attrs = vec![VariantAttribute { key: "org.gradle.usage".into(), value: "kotlin-api".into() }];
        let variant = FakesVariant::mirroring("com.example", "widgets", "1.2.3", &main_attrs, "build/generated/fakes");
        assert_eq!(variant.attributes, main_attrs);
        assert_eq!(variant.capability.coordinates(), "com.example:widgets-fakes:1.2.3");
        assert_eq!(variant.artifact_dir, "build/generated/fakes");
    }
}
