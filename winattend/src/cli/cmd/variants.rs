use std::process::ExitCode;

use crate::variant::VariantId;

pub fn run(cmd: super::Commands) -> ExitCode {
    match cmd {
        super::Commands::Variants {} => {
            println!("Variant      Name            Arch    Editions");
            for (id, variant) in VariantId::all() {
                println!(
                    "{:12} {:15} {:7} {}",
                    id.to_string(),
                    variant.display_name,
                    variant.arch.map(|arch| arch.to_string()).unwrap_or_default(),
                    variant.preference.join(", "),
                );
            }
            ExitCode::SUCCESS
        }
        _ => panic!(),
    }
}
