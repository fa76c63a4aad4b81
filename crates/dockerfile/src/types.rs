use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// The instruction kinds that produce documentation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    Arg,
    Env,
    Label,
    Expose,
}

impl ItemType {
    pub const ALL: [ItemType; 4] = [
        ItemType::Arg,
        ItemType::Env,
        ItemType::Label,
        ItemType::Expose,
    ];

    /// Section heading used by the renderers.
    pub fn heading(&self) -> &'static str {
        match self {
            ItemType::Arg => "Build Arguments",
            ItemType::Env => "Environment Variables",
            ItemType::Label => "Labels",
            ItemType::Expose => "Exposed Ports",
        }
    }
}

/// One documented variable, label or port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocItem {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub description: String,
    pub value: String,
    pub required: bool,
}

/// Documentation items for a whole Dockerfile, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    pub items: Vec<DocItem>,
}

impl Documentation {
    pub fn filter_by_type(&self, item_type: ItemType) -> Vec<&DocItem> {
        self.items
            .iter()
            .filter(|item| item.item_type == item_type)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(name: &str, item_type: ItemType) -> DocItem {
        DocItem {
            name: name.to_string(),
            item_type,
            description: String::new(),
            value: String::new(),
            required: false,
        }
    }

    #[test]
    fn test_filter_by_type() {
        let doc = Documentation {
            items: vec![
                item("PORT", ItemType::Env),
                item("DB_HOST", ItemType::Env),
                item("VERSION", ItemType::Arg),
                item("8080", ItemType::Expose),
                item("maintainer", ItemType::Label),
            ],
        };

        assert_eq!(doc.filter_by_type(ItemType::Env).len(), 2);
        assert_eq!(doc.filter_by_type(ItemType::Arg).len(), 1);
        assert_eq!(doc.filter_by_type(ItemType::Expose).len(), 1);
        assert_eq!(doc.filter_by_type(ItemType::Label).len(), 1);
        assert!(
            doc.filter_by_type(ItemType::Env)
                .iter()
                .all(|i| i.item_type == ItemType::Env)
        );
    }

    #[test]
    fn test_item_type_strings() {
        assert_eq!(ItemType::Expose.to_string(), "EXPOSE");
        assert_eq!(ItemType::from_str("env").unwrap(), ItemType::Env);
        assert!(ItemType::from_str("VOLUME").is_err());

        let json = serde_json::to_string(&item("A", ItemType::Arg)).unwrap();
        assert!(json.contains(r#""type":"ARG""#));
    }
}
