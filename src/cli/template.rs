use std::path::Path;

use crate::error::{RecpamError, Result};
use crate::export::UTF8_BOM;

const SAMPLE: &str = "\
Descripcion;Fecha;Monto_Historico
Rodado;15/12/2017;1000
Muebles y útiles;03/06/2019;2.500,75
Mercaderías;10/01/2020;300,50
";

pub fn run(output: &str, force: bool) -> Result<()> {
    let path = Path::new(output);
    write_template(path, force)?;
    println!("Wrote {}", path.display());
    println!("Fill in one row per item: Fecha as DD/MM/YYYY, Monto_Historico with a decimal comma.");
    Ok(())
}

pub fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(RecpamError::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let mut bytes = UTF8_BOM.to_vec();
    bytes.extend_from_slice(SAMPLE.as_bytes());
    std::fs::write(path, bytes)?;
    Ok(())
}
