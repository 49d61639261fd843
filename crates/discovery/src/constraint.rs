use std::fmt;

use crate::ad::ScheddAd;

/// Query predicates the locator issues against the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `StartSchedulerUniverse =?= true && CMSGWMS_Type =?= "<schedd_type>"`
    SchedulerUniverse { schedd_type: String },
    /// `Name =?= "<name>"`
    Name(String),
    /// Matches every ad.
    Any,
}

impl Constraint {
    pub fn scheduler_universe(schedd_type: &str) -> Self {
        Constraint::SchedulerUniverse {
            schedd_type: schedd_type.to_string(),
        }
    }

    pub fn name(name: &str) -> Self {
        Constraint::Name(name.to_string())
    }

    /// `=?=` is meta-equality: an undefined attribute never matches.
    pub fn matches(&self, ad: &ScheddAd) -> bool {
        match self {
            Constraint::SchedulerUniverse { schedd_type } => {
                ad.start_scheduler_universe == Some(true)
                    && ad.cms_gwms_type.as_deref() == Some(schedd_type.as_str())
            }
            Constraint::Name(name) => ad.name.as_deref() == Some(name.as_str()),
            Constraint::Any => true,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::SchedulerUniverse { schedd_type } => write!(
                f,
                "StartSchedulerUniverse =?= true && CMSGWMS_Type =?= {}",
                quote(schedd_type)
            ),
            Constraint::Name(name) => write!(f, "Name =?= {}", quote(name)),
            Constraint::Any => f.write_str("true"),
        }
    }
}

/// Quote a value as a ClassAd string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
