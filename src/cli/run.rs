//! Run command implementation

use clap::Args;

use crate::broadcast::NodeRole;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Consensus application host (overrides `consensus.host`)
    pub consensus_host: Option<String>,

    /// Node RPC host or URL for broadcasts (defaults to the consensus host)
    pub rpc_host: Option<String>,

    /// Force the broadcast role instead of deriving it from the designated node
    #[arg(long, value_enum)]
    pub role: Option<NodeRole>,
}

impl RunArgs {
    /// Apply this command's overrides to `config`
    pub fn apply(&self, config: &mut Config) {
        config.apply_overrides(
            self.consensus_host.as_deref(),
            self.rpc_host.as_deref(),
            self.role,
        );
    }

    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        self.apply(&mut config);
        crate::relay::run_relay(config).await
    }
}
