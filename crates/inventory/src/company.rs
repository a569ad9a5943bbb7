use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CompanyId, DomainResult};

use crate::{optional_text, required_text};

/// A company: the tenant that owns users, warehouses and stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Company {
    pub fn create(input: NewCompany, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: CompanyId::new(),
            name: required_text(&input.name, "company name")?,
            tax_id: optional_text(input.tax_id),
            address: optional_text(input.address),
            phone: optional_text(input.phone),
            created_at: now,
        })
    }

    pub fn apply(&mut self, patch: CompanyPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            self.name = required_text(&name, "company name")?;
        }
        if patch.tax_id.is_some() {
            self.tax_id = optional_text(patch.tax_id);
        }
        if patch.address.is_some() {
            self.address = optional_text(patch.address);
        }
        if patch.phone.is_some() {
            self.phone = optional_text(patch.phone);
        }
        Ok(())
    }
}

/// Partial update. For optional fields an empty string clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_name_and_trims_optionals() {
        let company = Company::create(
            NewCompany {
                name: "  Ferretería Central ".into(),
                tax_id: Some("  ".into()),
                address: Some(" Calle 5 ".into()),
                phone: None,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(company.name, "Ferretería Central");
        assert_eq!(company.tax_id, None);
        assert_eq!(company.address.as_deref(), Some("Calle 5"));

        assert!(Company::create(NewCompany::default(), Utc::now()).is_err());
    }

    #[test]
    fn patch_clears_with_empty_string() {
        let mut company = Company::create(
            NewCompany {
                name: "ACME".into(),
                phone: Some("555".into()),
                ..NewCompany::default()
            },
            Utc::now(),
        )
        .unwrap();
        company
            .apply(CompanyPatch {
                phone: Some(String::new()),
                ..CompanyPatch::default()
            })
            .unwrap();
        assert_eq!(company.phone, None);
        assert_eq!(company.name, "ACME");
    }
}
