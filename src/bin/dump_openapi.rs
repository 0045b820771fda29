use std::{env, fs};

fn main() -> anyhow::Result<()> {
    let out = env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    let doc = novel_nest::docs::build_openapi(8000);
    fs::write(&out, serde_json::to_string_pretty(&doc)?)?;
    println!("wrote {out}");
    Ok(())
}
