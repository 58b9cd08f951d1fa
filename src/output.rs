use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use csv::Writer;
use log::info;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::extractor::ExtractionReport;
use crate::netlist::spice_node_name;
use crate::schematic::Schematic;

/// One row of the pin-to-net table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinNetRecord {
    pub component: String,
    pub pin: String,
    pub x: f64,
    pub y: f64,
    pub net: String,
    pub spice_node: String,
}

/// Every pin with its resolved net, in schematic order
pub fn pin_net_records(model: &Schematic) -> Vec<PinNetRecord> {
    model
        .pins()
        .map(|(comp, pin)| {
            let net = pin.net.clone().unwrap_or_default();
            PinNetRecord {
                component: comp.reference.clone(),
                pin: pin.name.clone(),
                x: pin.x,
                y: pin.y,
                spice_node: spice_node_name(&net),
                net,
            }
        })
        .collect()
}

#[derive(Serialize)]
struct JsonExport<'a> {
    report: &'a ExtractionReport,
    pins: Vec<PinNetRecord>,
}

/// Export extraction results to a file
pub fn export_results(
    report: &ExtractionReport,
    model: &Schematic,
    filename: &str,
    format: &OutputFormat,
) -> Result<()> {
    let file = File::create(filename).with_context(|| format!("Failed to create '{}'", filename))?;

    match format {
        OutputFormat::Csv => write_csv(model, file)?,
        OutputFormat::Json => write_json(report, model, file)?,
    }

    info!("Results exported to {:?}: {}", format, filename);
    Ok(())
}

/// Write the pin-to-net table as CSV
pub fn write_csv<W: Write>(model: &Schematic, writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    for record in pin_net_records(model) {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the report plus the pin-to-net table as pretty JSON
pub fn write_json<W: Write>(report: &ExtractionReport, model: &Schematic, writer: W) -> Result<()> {
    let export = JsonExport {
        report,
        pins: pin_net_records(model),
    };
    serde_json::to_writer_pretty(writer, &export)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::NetExtractor;
    use crate::schematic::{Component, ComponentKind, NetLabel, Pin, Wire};

    fn sample() -> (Schematic, ExtractionReport) {
        let mut model = Schematic::new();
        model
            .add_component(Component::new(
                "R1",
                ComponentKind::Resistor,
                vec![Pin::new("1", 0.0, 0.0), Pin::new("2", 40.0, 0.0)],
            ))
            .add_wire(Wire::segment(40.0, 0.0, 80.0, 0.0).unwrap())
            .add_label(NetLabel::new("out", 80.0, 0.0));
        let report = NetExtractor::new().extract(&mut model);
        (model, report)
    }

    #[test]
    fn test_pin_net_records() {
        let (model, _) = sample();
        let records = pin_net_records(&model);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].net, "N001");
        assert_eq!(records[1].net, "OUT");
        assert_eq!(records[1].spice_node, "Vout");
    }

    #[test]
    fn test_csv_export() {
        let (model, report) = sample();
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        export_results(&report, &model, &path, &OutputFormat::Csv).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("component,pin,x,y,net,spice_node"));
        assert_eq!(lines.next(), Some("R1,1,0.0,0.0,N001,N001"));
        assert_eq!(lines.next(), Some("R1,2,40.0,0.0,OUT,Vout"));
    }

    #[test]
    fn test_json_export() {
        let (model, report) = sample();
        let mut buffer = Vec::new();
        write_json(&report, &model, &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["pins"].as_array().unwrap().len(), 2);
        assert_eq!(value["report"]["nets"][1]["name"], "OUT");
        assert_eq!(value["report"]["nets"][1]["origin"], "Label");
    }
}
