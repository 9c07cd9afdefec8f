use serde::Serialize;

/// The dashboard's menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    Dashboard,
    Portfolio,
    Alerts,
    Notifications,
    Export,
    Predictions,
    Indices,
}

pub struct SectionInfo {
    pub section: Section,
    pub path: &'static str,
    pub title: &'static str,
    pub template: &'static str,
}

pub const SECTIONS: &[SectionInfo] = &[
    SectionInfo { section: Section::Dashboard, path: "/", title: "Dashboard", template: "pages/dashboard" },
    SectionInfo { section: Section::Portfolio, path: "/portfolio", title: "Virtual portfolio", template: "pages/portfolio" },
    SectionInfo { section: Section::Alerts, path: "/alerts", title: "Price alerts", template: "pages/alerts" },
    SectionInfo { section: Section::Notifications, path: "/notifications", title: "Email notifications", template: "pages/notifications" },
    SectionInfo { section: Section::Export, path: "/export", title: "Data export", template: "pages/export" },
    SectionInfo { section: Section::Predictions, path: "/predictions", title: "Predictions", template: "pages/predictions" },
    SectionInfo { section: Section::Indices, path: "/indices", title: "CAC 40 & indices", template: "pages/indices" },
];

impl Section {
    pub fn info(self) -> &'static SectionInfo {
        // SECTIONS lists every variant
        SECTIONS
            .iter()
            .find(|i| i.section == self)
            .unwrap_or(&SECTIONS[0])
    }

    pub fn from_path(path: &str) -> Option<Section> {
        SECTIONS.iter().find(|i| i.path == path).map(|i| i.section)
    }

    pub fn path(self) -> &'static str {
        self.info().path
    }

    pub fn title(self) -> &'static str {
        self.info().title
    }

    pub fn template(self) -> &'static str {
        self.info().template
    }
}
