use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::record::{Record, RecordMeta};
use crate::validation::{self, Validate};

/// Travel agency (PPIU) that publishes packages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

impl Record for Agency {
    const COLLECTION: &'static str = "agencies";
    fn meta(&self) -> &RecordMeta { &self.meta }
    fn meta_mut(&mut self) -> &mut RecordMeta { &mut self.meta }
}

impl Validate for Agency {
    fn validate(&self) -> Result<(), ModelError> {
        validation::require("name", &self.name)?;
        validation::max_len("name", &self.name, 120)?;
        validation::slug("slug", &self.slug)?;
        validation::optional(&self.email, |v| validation::email("email", v))?;
        validation::optional(&self.website, |v| validation::link("website", v))?;
        validation::optional(&self.logo, |v| validation::link("logo", v))?;
        if !self.phone.is_empty()
            && !self.phone.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
        {
            return Err(ModelError::invalid("phone may only contain digits, spaces and + - ( )"));
        }
        Ok(())
    }
}
