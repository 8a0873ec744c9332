use std::io::{self, IsTerminal, Write};
use std::str::FromStr;

use anyhow::anyhow;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::band::{Classification, HourBand};
use crate::config::Config;
use crate::datetime::{format_hour_label, format_instant};
use crate::grid::GridPosition;
use crate::model::CalendarDataCollection;
use crate::navigation::Dateline;
use crate::planner::PlannerView;
use crate::resource_table::{ColumnDef, ResourceRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("invalid output format: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    format: OutputFormat,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            color: cfg.get_bool("color")?.unwrap_or(true),
            format: cfg.output_format()?,
        })
    }

    #[tracing::instrument(skip(self, classification))]
    pub fn print_classification(&mut self, classification: &Classification) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return print_json(classification);
        }

        let mut out = io::stdout().lock();
        writeln!(out, "band    {}", self.paint_band(classification.band))?;
        writeln!(out, "from    {}", format_instant(classification.window.from()))?;
        writeln!(out, "to      {}", format_instant(classification.window.to()))?;
        writeln!(out, "hours   {}", hour_labels(classification.band))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, collections))]
    pub fn print_collections(&mut self, collections: &[CalendarDataCollection]) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return print_json(&collections);
        }

        let headers = vec![
            "Group".to_string(),
            "Banner".to_string(),
            "Start".to_string(),
            "End".to_string(),
            "Color".to_string(),
        ];

        let mut rows = Vec::new();
        for (group, collection) in collections.iter().enumerate() {
            for instance in &collection.calendar_data {
                for item in &instance.items {
                    rows.push(vec![
                        self.paint(&(group + 1).to_string(), "33"),
                        instance.banner.clone(),
                        format_instant(item.start_date),
                        format_instant(item.end_date),
                        item.color.clone(),
                    ]);
                }
            }
        }

        write_table(io::stdout().lock(), headers, rows)
    }

    #[tracing::instrument(skip(self, position))]
    pub fn print_position(&mut self, band: HourBand, position: &GridPosition) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            #[derive(Serialize)]
            struct Placed<'a> {
                band: HourBand,
                #[serde(flatten)]
                position: &'a GridPosition,
            }
            return print_json(&Placed { band, position });
        }

        let mut out = io::stdout().lock();
        writeln!(out, "band    {}", self.paint_band(band))?;
        writeln!(out, "left    {}", position.left_css())?;
        writeln!(out, "width   {}", position.width_css())?;
        Ok(())
    }

    #[tracing::instrument(skip(self, view))]
    pub fn print_view(&mut self, view: &PlannerView) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return print_json(view);
        }

        let mut out = io::stdout().lock();
        writeln!(
            out,
            "{} {} ({})",
            self.paint_band(view.band),
            view.window,
            format_instant(view.reference)
        )?;
        writeln!(out, "{}", hour_labels(view.band))?;

        if view.is_empty() {
            writeln!(out, "No calendar items in window.")?;
            return Ok(());
        }

        let headers = vec![
            "Banner".to_string(),
            "Start".to_string(),
            "End".to_string(),
            "Left".to_string(),
            "Width".to_string(),
            "Color".to_string(),
        ];

        let rows = view
            .sections()
            .flat_map(|section| {
                section.items.iter().map(move |placed| {
                    vec![
                        section.banner.clone(),
                        format_instant(placed.item.start_date),
                        format_instant(placed.item.end_date),
                        format!("{:.2}%", placed.position.left_percent),
                        format!("{:.2}%", placed.position.width_percent),
                        placed.item.color.clone(),
                    ]
                })
            })
            .collect();

        write_table(&mut out, headers, rows)
    }

    #[tracing::instrument(skip(self, dateline))]
    pub fn print_dateline(&mut self, dateline: &Dateline) -> anyhow::Result<()> {
        let band = HourBand::for_reference(dateline.selected());
        if self.format == OutputFormat::Json {
            #[derive(Serialize)]
            struct Selection<'a> {
                #[serde(flatten)]
                dateline: &'a Dateline,
                band: Option<HourBand>,
            }
            return print_json(&Selection { dateline, band });
        }

        let mut out = io::stdout().lock();
        if let Some(band) = band {
            writeln!(out, "band    {}", self.paint_band(band))?;
        }
        for (idx, date) in dateline.dates.iter().enumerate() {
            let label = date.format("%a %Y-%m-%d %H:%M").to_string();
            if idx == 0 {
                writeln!(out, "{} *", self.paint(&label, "1"))?;
            } else {
                writeln!(out, "{label}")?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, columns, rows))]
    pub fn print_resource_table(&mut self, columns: &[ColumnDef], rows: &[ResourceRow]) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            #[derive(Serialize)]
            struct Table<'a> {
                columns: &'a [ColumnDef],
                rows: &'a [ResourceRow],
            }
            return print_json(&Table { columns, rows });
        }

        let headers = columns.iter().map(|column| column.header.clone()).collect();
        let body = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| {
                        if column.accessor_key == "period" {
                            row.period.clone()
                        } else {
                            row.cell(&column.accessor_key)
                                .map(|count| count.to_string())
                                .unwrap_or_default()
                        }
                    })
                    .collect()
            })
            .collect();

        write_table(io::stdout().lock(), headers, body)
    }

    pub fn print_config(&mut self, cfg: &Config) -> anyhow::Result<()> {
        let mut entries: Vec<_> = cfg.iter().collect();
        entries.sort();

        let rows = entries
            .into_iter()
            .map(|(key, value)| vec![key.clone(), value.clone()])
            .collect();
        write_table(
            io::stdout().lock(),
            vec!["Key".to_string(), "Value".to_string()],
            rows,
        )
    }

    fn paint_band(&self, band: HourBand) -> String {
        match band {
            HourBand::Regular => self.paint(band.as_str(), "32"),
            HourBand::Overtime => self.paint(band.as_str(), "35"),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn hour_labels(band: HourBand) -> String {
    band.hours()
        .iter()
        .map(|hour| format_hour_label(*hour))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
