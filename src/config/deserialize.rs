// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles application names, image refs, and namespaces.

use serde::Deserialize;

use crate::types::{AppName, ImageRef, Namespace};

pub fn deserialize_app_name<'de, D>(deserializer: D) -> Result<AppName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    AppName::new(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_image_ref<'de, D>(deserializer: D) -> Result<ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRef::parse(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_namespace_option<'de, D>(deserializer: D) -> Result<Option<Namespace>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(s) => Namespace::new(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
