use std::path::PathBuf;

use clap::Parser;

use crate::form::NegotiationForm;
use crate::protocol::Role;

#[derive(Parser, Debug)]
#[command(name = "salary-negotiator")]
#[command(version)]
#[command(about = "Negotiate a salary against an AI counterpart from the terminal")]
pub struct Args {
    /// Your side of the negotiation; prompted for when omitted
    #[arg(long, value_enum)]
    pub role: Option<Role>,

    /// Job title under negotiation
    #[arg(long)]
    pub job_title: Option<String>,

    /// Hiring company
    #[arg(long)]
    pub company: Option<String>,

    /// Job location
    #[arg(long)]
    pub location: Option<String>,

    /// Current salary
    #[arg(long)]
    pub current_salary: Option<String>,

    /// Desired salary
    #[arg(long)]
    pub desired_salary: Option<String>,

    /// Years of experience
    #[arg(long)]
    pub years_experience: Option<String>,

    /// Negotiation backend, e.g. http://localhost:8000 (overrides config and env)
    #[arg(long)]
    pub base_url: Option<String>,

    /// TOML config file with base_url / connect_timeout_secs / request_timeout_secs
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the backend's record of an existing session as JSON and exit
    #[arg(long, value_name = "SESSION_ID")]
    pub inspect: Option<String>,

    /// Debug logging on stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable colored transcript output
    #[arg(long)]
    pub no_color: bool,
}

/// A form field: its prompt label, the name validation reports it under,
/// and where it lives in the form.
pub struct FormField {
    pub label: &'static str,
    pub key: &'static str,
    pub get: fn(&mut NegotiationForm) -> &mut String,
}

pub const FORM_FIELDS: &[FormField] = &[
    FormField { label: "Job Title", key: "job_title", get: |f| &mut f.job_title },
    FormField { label: "Company", key: "company", get: |f| &mut f.company },
    FormField { label: "Location", key: "location", get: |f| &mut f.location },
    FormField { label: "Current Salary", key: "current_salary", get: |f| &mut f.current_salary },
    FormField { label: "Desired Salary", key: "desired_salary", get: |f| &mut f.desired_salary },
    FormField { label: "Years of Experience", key: "years_experience", get: |f| &mut f.years_experience },
];

impl Args {
    /// The form as far as the command line fills it. Missing fields are empty.
    pub fn prefilled_form(&self) -> NegotiationForm {
        let pick = |v: &Option<String>| v.clone().unwrap_or_default();
        NegotiationForm {
            job_title: pick(&self.job_title),
            company: pick(&self.company),
            location: pick(&self.location),
            current_salary: pick(&self.current_salary),
            desired_salary: pick(&self.desired_salary),
            years_experience: pick(&self.years_experience),
        }
    }
}
