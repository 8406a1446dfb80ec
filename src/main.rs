use schemelet::repl::{self, ReplConfig};

fn main() -> anyhow::Result<()> {
    repl::run(&ReplConfig::from_env())
}
