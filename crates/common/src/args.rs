use clap::Parser;

#[derive(Debug, Parser, Clone, Default)]
pub struct CliArgs {
    /// Emit machine-readable JSON instead of human output
    #[clap(short, long)]
    pub json: bool,
}

impl CliArgs {
    pub fn json_output(&self) -> bool {
        self.json
    }
}
