// SPDX-License-Identifier: Apache-2.0

//! What the device puts on the display

use std::fmt;

/// Role of a screen in the approval flow
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScreenKind {
    /// Summary with an optional "more details" action
    Overview,
    /// Detail page reached from an overview
    Details,
    /// Needs an explicit decision before continuing
    Warning,
    /// Final hold-to-sign page
    Confirm,
    /// Informational page, no decision taken
    Info,
    /// Error notice
    Error,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Accent {
    #[default]
    Normal,
    Danger,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BannerLevel {
    Info,
    Warning,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub level: BannerLevel,
    pub text: String,
}

impl Banner {
    pub fn warning(text: impl Into<String>) -> Self {
        Banner {
            level: BannerLevel::Warning,
            text: text.into(),
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Banner {
            level: BannerLevel::Danger,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Banner {
            level: BannerLevel::Info,
            text: text.into(),
        }
    }
}

/// One labelled value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub label: String,
    pub value: String,
    /// Hex data shown paginated in a monospace font
    pub paginated: bool,
}

impl Property {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Property {
            label: label.into(),
            value: value.into(),
            paginated: false,
        }
    }

    pub fn data(label: impl Into<String>, value: impl Into<String>) -> Self {
        Property {
            label: label.into(),
            value: value.into(),
            paginated: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    pub kind: ScreenKind,
    pub title: String,
    pub subtitle: Option<String>,
    pub properties: Vec<Property>,
    pub banners: Vec<Banner>,
    pub accent: Accent,
}

impl Screen {
    pub fn new(kind: ScreenKind, title: impl Into<String>) -> Self {
        Screen {
            kind,
            title: title.into(),
            subtitle: None,
            properties: Vec::new(),
            banners: Vec::new(),
            accent: Accent::Normal,
        }
    }

    pub fn overview(title: impl Into<String>) -> Self {
        Self::new(ScreenKind::Overview, title)
    }

    pub fn details(title: impl Into<String>) -> Self {
        Self::new(ScreenKind::Details, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(ScreenKind::Warning, title)
    }

    pub fn confirm(title: impl Into<String>) -> Self {
        Self::new(ScreenKind::Confirm, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(ScreenKind::Info, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(ScreenKind::Error, title)
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_properties(mut self, properties: impl IntoIterator<Item = Property>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn with_banner(mut self, banner: Banner) -> Self {
        self.banners.push(banner);
        self
    }

    pub fn with_accent(mut self, accent: Accent) -> Self {
        self.accent = accent;
        self
    }

    /// Look up a property by label
    pub fn property(&self, label: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.value.as_str())
    }

    pub fn has_banner(&self, text: &str) -> bool {
        self.banners.iter().any(|b| b.text == text)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.accent == Accent::Danger { "!!" } else { "==" };
        write!(f, "{} [{:?}] {}", marker, self.kind, self.title)?;
        if let Some(subtitle) = &self.subtitle {
            write!(f, " ({})", subtitle)?;
        }
        for banner in &self.banners {
            write!(f, "\n   [{:?}] {}", banner.level, banner.text)?;
        }
        for property in &self.properties {
            write!(f, "\n   {}: {}", property.label, property.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let screen = Screen::overview("Send 1 ETH")
            .with_property(Property::new("To", "0xabc"))
            .with_banner(Banner::warning("Unknown token"))
            .with_accent(Accent::Danger);

        assert_eq!(screen.property("To"), Some("0xabc"));
        assert_eq!(screen.property("From"), None);
        assert!(screen.has_banner("Unknown token"));
        assert!(screen.to_string().starts_with("!! [Overview] Send 1 ETH"));
    }
}
