//! Public site resources backed by Airtable: contact forms, company JD
//! follow-ups and the application form description.

pub mod company_jds;
pub mod contact;
pub mod form_config;
pub mod rate_limit;
