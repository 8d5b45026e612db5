//! ISIC Rev.4 section definitions.
//!
//! Panels label sectors either by section letter, by English name, or by the Arabic
//! section names used in the source registry. All three resolve to the same
//! [`IsicSection`]; anything else is carried as [`Sector::Unclassified`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISIC Rev.4 top-level sections (21 sections, A through U).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IsicSection {
    /// A: Agriculture, forestry and fishing
    Agriculture,
    /// B: Mining and quarrying
    Mining,
    /// C: Manufacturing
    Manufacturing,
    /// D: Electricity, gas, steam and air conditioning supply
    Electricity,
    /// E: Water supply; sewerage, waste management and remediation
    WaterSupply,
    /// F: Construction
    Construction,
    /// G: Wholesale and retail trade; repair of motor vehicles
    Trade,
    /// H: Transportation and storage
    Transportation,
    /// I: Accommodation and food service activities
    Accommodation,
    /// J: Information and communication
    Information,
    /// K: Financial and insurance activities
    Finance,
    /// L: Real estate activities
    RealEstate,
    /// M: Professional, scientific and technical activities
    Professional,
    /// N: Administrative and support service activities
    Administrative,
    /// O: Public administration and defence; compulsory social security
    PublicAdministration,
    /// P: Education
    Education,
    /// Q: Human health and social work activities
    Health,
    /// R: Arts, entertainment and recreation
    Arts,
    /// S: Other service activities
    OtherServices,
    /// T: Activities of households as employers
    Households,
    /// U: Activities of extraterritorial organizations and bodies
    Extraterritorial,
}

impl IsicSection {
    /// Returns all sections in letter order.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Agriculture,
            Self::Mining,
            Self::Manufacturing,
            Self::Electricity,
            Self::WaterSupply,
            Self::Construction,
            Self::Trade,
            Self::Transportation,
            Self::Accommodation,
            Self::Information,
            Self::Finance,
            Self::RealEstate,
            Self::Professional,
            Self::Administrative,
            Self::PublicAdministration,
            Self::Education,
            Self::Health,
            Self::Arts,
            Self::OtherServices,
            Self::Households,
            Self::Extraterritorial,
        ]
    }

    /// Returns the section letter.
    pub const fn code(&self) -> char {
        match self {
            Self::Agriculture => 'A',
            Self::Mining => 'B',
            Self::Manufacturing => 'C',
            Self::Electricity => 'D',
            Self::WaterSupply => 'E',
            Self::Construction => 'F',
            Self::Trade => 'G',
            Self::Transportation => 'H',
            Self::Accommodation => 'I',
            Self::Information => 'J',
            Self::Finance => 'K',
            Self::RealEstate => 'L',
            Self::Professional => 'M',
            Self::Administrative => 'N',
            Self::PublicAdministration => 'O',
            Self::Education => 'P',
            Self::Health => 'Q',
            Self::Arts => 'R',
            Self::OtherServices => 'S',
            Self::Households => 'T',
            Self::Extraterritorial => 'U',
        }
    }

    /// Returns the full English section name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Agriculture => "Agriculture, forestry and fishing",
            Self::Mining => "Mining and quarrying",
            Self::Manufacturing => "Manufacturing",
            Self::Electricity => "Electricity, gas, steam and air conditioning supply",
            Self::WaterSupply => "Water supply; sewerage, waste management and remediation",
            Self::Construction => "Construction",
            Self::Trade => "Wholesale and retail trade; repair of motor vehicles and motorcycles",
            Self::Transportation => "Transportation and storage",
            Self::Accommodation => "Accommodation and food service activities",
            Self::Information => "Information and communication",
            Self::Finance => "Financial and insurance activities",
            Self::RealEstate => "Real estate activities",
            Self::Professional => "Professional, scientific and technical activities",
            Self::Administrative => "Administrative and support service activities",
            Self::PublicAdministration => {
                "Public administration and defence; compulsory social security"
            }
            Self::Education => "Education",
            Self::Health => "Human health and social work activities",
            Self::Arts => "Arts, entertainment and recreation",
            Self::OtherServices => "Other service activities",
            Self::Households => "Activities of households as employers",
            Self::Extraterritorial => "Activities of extraterritorial organizations and bodies",
        }
    }

    /// Returns the Arabic section label used by the national SME registry.
    pub const fn arabic_name(&self) -> &'static str {
        match self {
            Self::Agriculture => "الزراعة والحراجة وصيد الأسماك",
            Self::Mining => "التعدين واستغلال المحاجر",
            Self::Manufacturing => "الصناعة التحويلية",
            Self::Electricity => "إمدادات الكهرباء والغاز والبخار وتكييف الهواء",
            Self::WaterSupply => "إمدادات المياه؛ الصرف الصحي وإدارة النفايات ومعالجتها",
            Self::Construction => "التشييد والبناء",
            Self::Trade => {
                "تجارة الجملة والتجزئة؛ إصلاح المركبات ذات المحركات والدراجات النارية"
            }
            Self::Transportation => "النقل والتخزين",
            Self::Accommodation => "أنشطة الإقامة وخدمات الطعام",
            Self::Information => "المعلومات والاتصالات",
            Self::Finance => "الأنشطة المالية وأنشطة التأمين",
            Self::RealEstate => "الأنشطة العقارية",
            Self::Professional => "الأنشطة المهنية والعلمية والتقنية",
            Self::Administrative => "أنشطة الخدمات الإدارية وخدمات الدعم",
            Self::PublicAdministration => "الإدارة العامة والدفاع؛ الضمان الاجتماعي الإلزامي",
            Self::Education => "التعليم",
            Self::Health => "الصحة البشرية والعمل الاجتماعي",
            Self::Arts => "الفنون والترفيه والتسلية",
            Self::OtherServices => "أنشطة الخدمات الأخرى",
            Self::Households => {
                "أنشطة الأسر المعيشية كأصحاب عمل؛ أنشطة إنتاج السلع والخدمات للاستخدام الخاص"
            }
            Self::Extraterritorial => "أنشطة المنظمات والهيئات خارج الإقليم",
        }
    }

    /// Parse a section from its letter (case-insensitive).
    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_uppercase();
        Self::all().into_iter().find(|s| s.code() == code)
    }

    /// Parse a section from a letter, English name or Arabic label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let mut chars = label.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_code(c);
        }
        Self::all()
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(label) || s.arabic_name() == label)
    }
}

impl fmt::Display for IsicSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sector assignment of a panel record.
///
/// Grouping compares sectors by exact equality, so two unclassified labels that differ
/// only in spelling form distinct segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sector {
    /// A recognised ISIC section
    Isic(IsicSection),
    /// A label outside the registry, kept verbatim (trimmed)
    Unclassified(String),
}

impl Sector {
    /// Resolve a raw label to a sector.
    pub fn parse(label: &str) -> Self {
        IsicSection::from_label(label)
            .map_or_else(|| Self::Unclassified(label.trim().to_string()), Self::Isic)
    }

    /// Returns the ISIC section, if recognised.
    pub const fn section(&self) -> Option<IsicSection> {
        match self {
            Self::Isic(section) => Some(*section),
            Self::Unclassified(_) => None,
        }
    }

    /// Returns the section letter as a string, or an empty string when unclassified.
    pub fn code(&self) -> String {
        self.section().map(|s| s.code().to_string()).unwrap_or_default()
    }

    /// Grouping key for DataFrame partitions, distinct for every sector.
    pub fn partition_key(&self) -> String {
        match self {
            Self::Isic(section) => format!("isic:{}", section.code()),
            Self::Unclassified(label) => format!("label:{label}"),
        }
    }
}

impl From<IsicSection> for Sector {
    fn from(section: IsicSection) -> Self {
        Self::Isic(section)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Isic(section) => write!(f, "{section}"),
            Self::Unclassified(label) => write!(f, "{label}"),
        }
    }
}
