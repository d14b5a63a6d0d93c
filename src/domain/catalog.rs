//! Catalog vocabulary: resource types, approval states and user roles.
//!
//! Stored as plain strings in the database; these enums are the only place
//! the accepted values are spelled out.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    App,
    Tool,
    Website,
    Ai,
    Other,
}

/// Display metadata for a resource type, shown when browsing a program
#[derive(Debug, Clone, Serialize)]
pub struct ResourceTypeInfo {
    pub key: &'static str,
    pub display: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

impl ResourceType {
    /// Types offered when browsing a program, in display order
    pub const BROWSABLE: [ResourceType; 4] = [
        ResourceType::Ai,
        ResourceType::Tool,
        ResourceType::App,
        ResourceType::Website,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Tool => "tool",
            Self::Website => "website",
            Self::Ai => "ai",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "app" => Some(Self::App),
            "tool" => Some(Self::Tool),
            "website" => Some(Self::Website),
            "ai" => Some(Self::Ai),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Self::App => "Application",
            Self::Tool => "Web Tool",
            Self::Website => "Website",
            Self::Ai => "Artificial Intelligence",
            Self::Other => "Other",
        }
    }

    pub fn info(&self) -> ResourceTypeInfo {
        let (icon, description) = match self {
            Self::Ai => ("bi-robot", "Generative AI platforms and models."),
            Self::Tool => ("bi-tools", "Services and utilities that run in the browser."),
            Self::App => (
                "bi-window-stack",
                "Installable software for desktop or mobile.",
            ),
            Self::Website => (
                "bi-globe",
                "Informational sites, portfolios and references.",
            ),
            Self::Other => ("bi-box", "Anything that does not fit elsewhere."),
        };

        ResourceTypeInfo {
            key: self.as_str(),
            display: self.display(),
            icon,
            description,
        }
    }
}

/// Moderation state of a resource. Only approved resources are browsable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    Pending,
    Approved,
    Rejected,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Teacher,
    ContentManager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::ContentManager => "content_manager",
            Self::Admin => "admin",
        }
    }

    /// Unknown role strings fall back to the least privileged role
    pub fn parse(s: &str) -> Self {
        match s {
            "teacher" => Self::Teacher,
            "content_manager" => Self::ContentManager,
            "admin" => Self::Admin,
            _ => Self::Student,
        }
    }

    pub fn can_suggest(&self) -> bool {
        matches!(self, Self::Teacher | Self::Admin)
    }

    pub fn can_moderate(&self) -> bool {
        matches!(self, Self::ContentManager | Self::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_type_parses_stored_values() {
        for t in [
            ResourceType::App,
            ResourceType::Tool,
            ResourceType::Website,
            ResourceType::Ai,
            ResourceType::Other,
        ] {
            assert_eq!(ResourceType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ResourceType::parse("pagina_web"), None);
    }

    #[test]
    fn resource_status_parses_stored_values() {
        assert_eq!(ResourceStatus::parse("approved"), Some(ResourceStatus::Approved));
        assert_eq!(ResourceStatus::parse("pending"), Some(ResourceStatus::Pending));
        assert_eq!(ResourceStatus::parse("Approved"), None);
    }

    #[test]
    fn browsable_types_exclude_other() {
        let keys: Vec<&str> = ResourceType::BROWSABLE.iter().map(|t| t.info().key).collect();
        assert_eq!(keys, vec!["ai", "tool", "app", "website"]);
    }

    #[test]
    fn role_permissions() {
        assert!(Role::Teacher.can_suggest());
        assert!(Role::Admin.can_suggest());
        assert!(!Role::Student.can_suggest());
        assert!(!Role::ContentManager.can_suggest());

        assert!(Role::ContentManager.can_moderate());
        assert!(!Role::Teacher.can_moderate());
        assert_eq!(Role::parse("something-else"), Role::Student);
    }
}
