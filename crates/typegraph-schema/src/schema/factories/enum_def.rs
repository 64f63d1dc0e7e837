use crate::metadata::EnumMetadata;
use crate::schema::definitions::{EnumDefinition, EnumType, EnumValueDefinition};

pub struct EnumDefinitionFactory;

impl EnumDefinitionFactory {
    /// Enums have no body to link, so the definition is complete on creation.
    pub fn create(metadata: &EnumMetadata) -> EnumDefinition {
        let values = metadata
            .values
            .iter()
            .map(|value| EnumValueDefinition {
                name: value.name.clone(),
                description: value.description.clone(),
                deprecation_reason: value.deprecation_reason.clone(),
            })
            .collect();

        EnumDefinition {
            target: metadata.target.clone(),
            ty: EnumType {
                name: metadata.name.clone(),
                description: metadata.description.clone(),
                values,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::EnumValueMetadata;

    #[test]
    fn test_values_keep_presentation() {
        let metadata = EnumMetadata::new("Difficulty")
            .description("How hard a recipe is")
            .value("EASY")
            .value(EnumValueMetadata::new("HARD").deprecation_reason("use EXPERT"));

        let def = EnumDefinitionFactory::create(&metadata);
        assert_eq!(def.ty.name, "Difficulty");
        assert_eq!(def.ty.values.len(), 2);
        assert_eq!(def.ty.values[1].deprecation_reason.as_deref(), Some("use EXPERT"));
    }
}
