use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! palette_keys {
    ($( $variant:ident => $field:ident, $wire:literal, $label:literal; )*) => {
        /// A complete set of semantic colors.
        ///
        /// Deserializing fills any missing key from the light palette.
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct Palette {
            $( pub $field: String, )*
        }

        /// Semantic color slot
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum ColorKey {
            $( $variant, )*
        }

        impl ColorKey {
            pub const ALL: &'static [ColorKey] = &[$( ColorKey::$variant, )*];

            /// Key as stored and shown on the wire
            pub fn as_str(self) -> &'static str {
                match self {
                    $( ColorKey::$variant => $wire, )*
                }
            }

            /// Human-readable name
            pub fn label(self) -> &'static str {
                match self {
                    $( ColorKey::$variant => $label, )*
                }
            }
        }

        impl FromStr for ColorKey {
            type Err = UnknownColorKey;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(ColorKey::$variant), )*
                    other => Err(UnknownColorKey(other.to_string())),
                }
            }
        }

        impl Palette {
            pub fn get(&self, key: ColorKey) -> &str {
                match key {
                    $( ColorKey::$variant => &self.$field, )*
                }
            }

            pub fn set(&mut self, key: ColorKey, value: impl Into<String>) {
                let slot = match key {
                    $( ColorKey::$variant => &mut self.$field, )*
                };
                *slot = value.into();
            }
        }
    };
}

palette_keys! {
    Background => background, "background", "Background";
    Surface => surface, "surface", "Surface";
    Card => card, "card", "Card";
    Text => text, "text", "Text";
    TextSecondary => text_secondary, "textSecondary", "Text Secondary";
    TextTertiary => text_tertiary, "textTertiary", "Text Tertiary";
    Primary => primary, "primary", "Primary";
    PrimaryLight => primary_light, "primaryLight", "Primary Light";
    Accent => accent, "accent", "Accent";
    AccentLight => accent_light, "accentLight", "Accent Light";
    Success => success, "success", "Success";
    Warning => warning, "warning", "Warning";
    Error => error, "error", "Error";
    Info => info, "info", "Info";
    Border => border, "border", "Border";
    Divider => divider, "divider", "Divider";
    Placeholder => placeholder, "placeholder", "Placeholder";
    Disabled => disabled, "disabled", "Disabled";
    Shadow => shadow, "shadow", "Shadow";
    ShadowStrong => shadow_strong, "shadowStrong", "Shadow Strong";
    CategoryBadge => category_badge, "categoryBadge", "Category Badge";
    InputBackground => input_background, "inputBackground", "Input Background";
    InputBorder => input_border, "inputBorder", "Input Border";
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color key: {0}")]
pub struct UnknownColorKey(pub String);

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}

impl Palette {
    pub fn light() -> Self {
        Self {
            background: "#f5f5f5".into(),
            surface: "#ffffff".into(),
            card: "#ffffff".into(),
            text: "#333333".into(),
            text_secondary: "#666666".into(),
            text_tertiary: "#999999".into(),
            primary: "#007AFF".into(),
            primary_light: "#5AC8FA".into(),
            accent: "#FF3B30".into(),
            accent_light: "#FF6B6B".into(),
            success: "#34C759".into(),
            warning: "#FF9500".into(),
            error: "#FF3B30".into(),
            info: "#007AFF".into(),
            border: "#e0e0e0".into(),
            divider: "#e0e0e0".into(),
            placeholder: "#C7C7CC".into(),
            disabled: "#d1d1d6".into(),
            shadow: "rgba(0, 0, 0, 0.1)".into(),
            shadow_strong: "rgba(0, 0, 0, 0.2)".into(),
            category_badge: "#007AFF".into(),
            input_background: "#f8f8f8".into(),
            input_border: "#e0e0e0".into(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#000000".into(),
            surface: "#1C1C1E".into(),
            card: "#2C2C2E".into(),
            text: "#FFFFFF".into(),
            text_secondary: "#EBEBF5".into(),
            text_tertiary: "#8E8E93".into(),
            primary: "#0A84FF".into(),
            primary_light: "#64D2FF".into(),
            accent: "#FF453A".into(),
            accent_light: "#FF6961".into(),
            success: "#32D74B".into(),
            warning: "#FF9F0A".into(),
            error: "#FF453A".into(),
            info: "#0A84FF".into(),
            border: "#38383A".into(),
            divider: "#38383A".into(),
            placeholder: "#636366".into(),
            disabled: "#48484A".into(),
            shadow: "rgba(0, 0, 0, 0.3)".into(),
            shadow_strong: "rgba(0, 0, 0, 0.5)".into(),
            category_badge: "#0A84FF".into(),
            input_background: "#38383A".into(),
            input_border: "#48484A".into(),
        }
    }

    /// `(key, value)` pairs in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (ColorKey, &str)> {
        ColorKey::ALL.iter().map(move |&key| (key, self.get(key)))
    }
}
