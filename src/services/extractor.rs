use thirtyfour::error::WebDriverResult;

use crate::domain::descriptor::{text_matches, Descriptor, FieldDescriptor};
use crate::services::browser::Region;

/// Reads one field's text from a region. Never fails: absence and lookup
/// errors alike are logged by field name and collapse to empty text, so the
/// caller decides whether an empty field is acceptable.
pub async fn extract_text<R: Region>(scope: &R, field: &FieldDescriptor) -> String {
    match lookup_text(scope, field).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            log::warn!("Can't find element: {}", field.name);
            String::new()
        }
        Err(e) => {
            log::warn!("Lookup failed for {}: {:?}", field.name, e);
            String::new()
        }
    }
}

/// Presence test for badge-style indicators. Likewise never fails.
pub async fn badge_present<R: Region>(scope: &R, field: &FieldDescriptor) -> bool {
    match lookup_presence(scope, field).await {
        Ok(present) => present,
        Err(e) => {
            log::warn!("Lookup failed for {}: {:?}", field.name, e);
            false
        }
    }
}

async fn lookup_text<R: Region>(
    scope: &R,
    field: &FieldDescriptor,
) -> WebDriverResult<Option<String>> {
    match field.descriptor {
        Descriptor::Structural(locator) => match scope.find_one(locator).await? {
            Some(region) => Ok(Some(region.text().await?)),
            None => Ok(None),
        },
        Descriptor::ContentMatch {
            scope: candidates,
            pattern,
        } => {
            for region in scope.find_all(candidates).await? {
                let text = region.text().await?;
                if text_matches(&text, pattern) {
                    return Ok(Some(text.trim().to_string()));
                }
            }
            Ok(None)
        }
    }
}

async fn lookup_presence<R: Region>(
    scope: &R,
    field: &FieldDescriptor,
) -> WebDriverResult<bool> {
    match field.descriptor {
        Descriptor::Structural(locator) => Ok(scope.find_one(locator).await?.is_some()),
        Descriptor::ContentMatch {
            scope: candidates,
            pattern,
        } => {
            for region in scope.find_all(candidates).await? {
                if text_matches(&region.text().await?, pattern) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}
