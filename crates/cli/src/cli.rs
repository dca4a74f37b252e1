use airdrop_common::args::CliArgs;
use airdrop_core::{
    campaign::CampaignArgs,
    deployment::ResolveArgs,
    eligibility::ProveArgs,
};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "airdrop",
    version,
    about = "Airdrop campaign and eligibility proof tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    #[command(flatten)]
    pub args: CliArgs,
}

#[derive(clap::Subcommand)]
#[allow(clippy::large_enum_variant)]
pub enum Commands {
    #[command(name = "campaign")]
    Campaign(CampaignArgs),
    #[command(name = "prove")]
    Prove(ProveArgs),
    #[command(name = "resolve")]
    Resolve(ResolveArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_campaign_command_with_defaults() {
        let cli = Cli::try_parse_from(["airdrop", "campaign", "--private-key", "0xabc"]).unwrap();
        match cli.command {
            Commands::Campaign(args) => {
                assert_eq!(args.manager_contract, "AirdropManager");
                assert_eq!(args.chain_id, 84532);
            }
            _ => panic!("expected campaign command"),
        }
    }

    #[test]
    fn parses_prove_command_with_json_flag() {
        let cli = Cli::try_parse_from([
            "airdrop",
            "--json",
            "prove",
            "--private-key",
            "0xabc",
            "--prover-url",
            "http://localhost:3000",
            "--user",
            "0x00000000000000000000000000000000000000cc",
        ])
        .unwrap();

        assert!(cli.args.json_output());
        match cli.command {
            Commands::Prove(args) => {
                assert_eq!(args.prover_url, "http://localhost:3000");
                assert_eq!(args.prover_contract, "AverageBalance");
            }
            _ => panic!("expected prove command"),
        }
    }

    #[test]
    fn parses_resolve_command_with_contract_name() {
        let cli = Cli::try_parse_from(["airdrop", "resolve", "AirdropManager"]).unwrap();
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.contract_name.as_deref(), Some("AirdropManager"));
            }
            _ => panic!("expected resolve command"),
        }
    }

    #[test]
    fn resolve_without_name_targets_anonymous_records() {
        let cli = Cli::try_parse_from(["airdrop", "resolve"]).unwrap();
        match cli.command {
            Commands::Resolve(args) => assert!(args.contract_name.is_none()),
            _ => panic!("expected resolve command"),
        }
    }
}
