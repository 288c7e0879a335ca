//! # Discover Subcommand
//!
//! Lists a company's suppliers. A failed discovery prints the fallback
//! list, the same list an audit would use.

use anyhow::Result;
use clap::Args;

use scaudit_core::Supplier;
use scaudit_providers::discover_or_fallback;

use crate::Providers;

/// Arguments for the `scaudit discover` subcommand.
#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Company whose suppliers to list.
    #[arg(long)]
    pub company: String,

    /// Print the suppliers as a JSON array.
    #[arg(long)]
    pub json: bool,

    /// Use the offline supplier list even when a service is configured.
    #[arg(long)]
    pub offline: bool,
}

/// One tab-separated line per supplier.
pub fn render_table(suppliers: &[Supplier]) -> String {
    let mut out = String::from("ID\tNAME\tINDUSTRY\tLOCATION\tEMISSIONS\tFLAGS\n");
    for s in suppliers {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{:.2}\t{}\n",
            s.id, s.name, s.industry, s.location, s.emissions, s.compliance_flags
        ));
    }
    out
}

/// Execute the discover subcommand.
pub fn run_discover(args: &DiscoverArgs) -> Result<u8> {
    let providers = Providers::from_env(args.offline)?;
    let rt = crate::runtime()?;
    let suppliers = rt.block_on(discover_or_fallback(providers.discovery.as_ref(), &args.company));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suppliers)?);
    } else {
        print!("{}", render_table(&suppliers));
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaudit_providers::fallback_suppliers;

    #[test]
    fn table_has_header_and_rows() {
        let table = render_table(&fallback_suppliers());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID\tNAME"));
        assert_eq!(lines[1], "1\tGlobal Steel Co\tRaw Materials\tMumbai, India\t0.80\t2");
    }
}
