//! CLI error handling

use thiserror::Error;

use core_kernel::PortError;
use domain_client::ClientFormError;
use domain_policy::PolicyFormError;

/// Errors a command can end with
///
/// The display text is what the user sees on stderr.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to load client details")]
    LoadClient {
        #[source]
        source: Option<PortError>,
    },

    #[error(transparent)]
    ClientForm(#[from] ClientFormError),

    #[error(transparent)]
    PolicyForm(#[from] PolicyFormError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    pub fn load_client(source: Option<PortError>) -> Self {
        CliError::LoadClient { source }
    }
}
