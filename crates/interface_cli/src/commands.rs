//! Command definitions and execution
//!
//! ```text
//! insurance-crm clients list
//! insurance-crm clients show <ID>
//! insurance-crm clients add --first-name .. --last-name .. --email .. --date-of-birth ..
//! insurance-crm policies add <CLIENT_ID> --type .. --coverage .. --beneficiary-name .. --beneficiary-relation ..
//! ```

use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

use core_kernel::ClientId;
use domain_client::{ClientField, ClientForm, ClientPort};
use domain_policy::{EstimateOutcome, PolicyField, PolicyFormController, PolicyPort};
use infra_http::CrmApiClient;

use crate::error::CliError;
use crate::views;

/// Insurance CRM command-line client
#[derive(Debug, Parser)]
#[command(name = "insurance-crm", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse and create clients
    #[command(subcommand)]
    Clients(ClientsCommand),
    /// Create policies
    #[command(subcommand)]
    Policies(PoliciesCommand),
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List every client
    List,
    /// Show a client with its policies
    Show {
        /// Client ID
        id: String,
    },
    /// Create a client
    Add(AddClientArgs),
}

#[derive(Debug, Subcommand)]
pub enum PoliciesCommand {
    /// Create a policy for a client, showing the premium estimate first
    Add(AddPolicyArgs),
}

#[derive(Debug, Args)]
pub struct AddClientArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub occupation: Option<String>,
    #[arg(long)]
    pub annual_income: Option<String>,
}

impl AddClientArgs {
    fn fields(&self) -> Vec<(ClientField, &str)> {
        let mut fields = vec![
            (ClientField::FirstName, self.first_name.as_str()),
            (ClientField::LastName, self.last_name.as_str()),
            (ClientField::Email, self.email.as_str()),
            (ClientField::DateOfBirth, self.date_of_birth.as_str()),
        ];
        let optional = [
            (ClientField::Phone, &self.phone),
            (ClientField::Address, &self.address),
            (ClientField::Occupation, &self.occupation),
            (ClientField::AnnualIncome, &self.annual_income),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(field, value)| value.as_deref().map(|v| (field, v))),
        );
        fields
    }
}

#[derive(Debug, Args)]
pub struct AddPolicyArgs {
    /// Client ID
    pub client_id: String,
    /// Policy type, e.g. TERM_LIFE or "whole life"
    #[arg(long = "type", default_value = "TERM_LIFE")]
    pub policy_type: String,
    #[arg(long)]
    pub coverage: String,
    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    pub start_date: Option<String>,
    #[arg(long)]
    pub term_years: Option<String>,
    #[arg(long)]
    pub convertible: bool,
    #[arg(long)]
    pub cash_value: Option<String>,
    #[arg(long)]
    pub investment_component: Option<String>,
    #[arg(long)]
    pub interest_rate: Option<String>,
    #[arg(long)]
    pub beneficiary_name: String,
    #[arg(long)]
    pub beneficiary_relation: String,
}

impl AddPolicyArgs {
    /// Field inputs in the order a user would fill them in
    fn fields(&self) -> Vec<(PolicyField, &str)> {
        let mut fields = vec![
            (PolicyField::PolicyType, self.policy_type.as_str()),
            (PolicyField::CoverageAmount, self.coverage.as_str()),
        ];
        let optional = [
            (PolicyField::StartDate, &self.start_date),
            (PolicyField::TermYears, &self.term_years),
            (PolicyField::CashValue, &self.cash_value),
            (PolicyField::InvestmentComponent, &self.investment_component),
            (PolicyField::InterestRate, &self.interest_rate),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(field, value)| value.as_deref().map(|v| (field, v))),
        );
        if self.convertible {
            fields.push((PolicyField::Convertible, "true"));
        }
        fields.push((PolicyField::BeneficiaryName, self.beneficiary_name.as_str()));
        fields.push((PolicyField::BeneficiaryRelation, self.beneficiary_relation.as_str()));
        fields
    }
}

/// The service ports commands run against
#[derive(Clone)]
pub struct Services {
    pub clients: Arc<dyn ClientPort>,
    pub policies: Arc<dyn PolicyPort>,
}

impl Services {
    /// Uses one HTTP client for both ports
    pub fn from_api(api: CrmApiClient) -> Self {
        let api = Arc::new(api);
        Self {
            clients: api.clone(),
            policies: api,
        }
    }
}

/// Runs a parsed command, writing user-facing output to `out`
pub async fn run(cli: Cli, services: &Services, out: &mut impl Write) -> Result<(), CliError> {
    match cli.command {
        Command::Clients(ClientsCommand::List) => list_clients(services, out).await,
        Command::Clients(ClientsCommand::Show { id }) => show_client(services, &id, out).await,
        Command::Clients(ClientsCommand::Add(args)) => add_client(services, &args, out).await,
        Command::Policies(PoliciesCommand::Add(args)) => add_policy(services, &args, out).await,
    }
}

/// Prints the client table; load failures print an empty list
pub async fn list_clients(services: &Services, out: &mut impl Write) -> Result<(), CliError> {
    let clients = match services.clients.list_clients(None).await {
        Ok(clients) => clients,
        Err(e) => {
            warn!(error = %e, "Failed to load clients");
            Vec::new()
        }
    };
    write!(out, "{}", views::render_client_table(&clients))?;
    Ok(())
}

pub async fn show_client(
    services: &Services,
    raw_id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let id: ClientId = raw_id.parse().map_err(|_| CliError::load_client(None))?;
    let client = services.clients.get_client(id, None).await.map_err(|e| {
        warn!(client_id = %id, error = %e, "Failed to load client");
        CliError::load_client(Some(e))
    })?;
    write!(out, "{}", views::render_client_details(&client))?;
    Ok(())
}

pub async fn add_client(
    services: &Services,
    args: &AddClientArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut form = ClientForm::new();
    for (field, value) in args.fields() {
        form.set(field, value);
    }

    let client = form.submit(services.clients.as_ref()).await?;
    let id = client.id.map(|id| id.to_string()).unwrap_or_default();
    writeln!(out, "Created client {} ({})", client.full_name(), id)?;
    Ok(())
}

/// Fills the policy form field by field, shows the estimate, then submits
///
/// Each field change may issue a new estimate request; only the last one
/// issued is sent. A failed estimate is reported but does not stop the
/// submission.
pub async fn add_policy(
    services: &Services,
    args: &AddPolicyArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut form = PolicyFormController::new(services.policies.clone());

    let mut pending = None;
    for (field, value) in args.fields() {
        if let Some(request) = form.set(field, value)? {
            pending = Some(request);
        }
    }
    if let Some(request) = form.bind_client(&args.client_id)? {
        pending = Some(request);
    }

    if let Some(request) = pending {
        match form.apply_estimate(request.send().await) {
            EstimateOutcome::Updated(premium) => writeln!(out, "{}", views::format_estimate(premium))?,
            EstimateOutcome::Failed(message) => writeln!(out, "Premium estimate unavailable: {message}")?,
            EstimateOutcome::Superseded => {}
        }
    }

    let policy = form.submit().await?;
    info!(policy_id = ?policy.id, "Policy submitted from CLI");
    writeln!(out, "Created {} policy", views::format_policy_type(policy.policy_type))?;
    writeln!(out)?;

    show_client(services, &args.client_id, out).await
}
