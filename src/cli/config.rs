use crate::error::Result;
use crate::settings::{cache_dir, load_settings, save_settings, shellexpand_path};

pub fn run(index: Option<&str>, symbol: Option<&str>, export_dir: Option<&str>) -> Result<()> {
    let mut settings = load_settings();
    let changed = index.is_some() || symbol.is_some() || export_dir.is_some();

    if let Some(path) = index {
        settings.index_file = Some(shellexpand_path(path));
    }
    if let Some(symbol) = symbol {
        settings.currency_symbol = symbol.to_string();
    }
    if let Some(dir) = export_dir {
        settings.export_dir = shellexpand_path(dir);
    }
    if changed {
        save_settings(&settings)?;
        println!("Settings saved.");
    }

    println!(
        "Index file:  {}",
        settings.index_file.as_deref().unwrap_or("(not set)")
    );
    println!("Symbol:      {}", settings.currency_symbol);
    println!("Export dir:  {}", settings.export_dir);
    println!("Cache dir:   {}", cache_dir().display());
    Ok(())
}
