/// Build revision, injected through `ESCALE_REVISION` at compile time.
const REVISION: &str = match option_env!("ESCALE_REVISION") {
    Some(rev) => rev,
    None => "development",
};

pub fn version() -> anyhow::Result<()> {
    println!("version: v{} (rev: {REVISION})", env!("CARGO_PKG_VERSION"));
    Ok(())
}
