//! Output formatting module

use std::fmt::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::models::Place;
use crate::planner::RoutePlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub fn render_plan(output_format: OutputFormat, plan: &RoutePlan) -> Result<String> {
    if output_format == OutputFormat::Json {
        return serde_json::to_string_pretty(plan).context("Failed to serialize route plan");
    }

    let mut out = String::new();
    writeln!(out, "\nRoute Options")?;
    writeln!(out, "=============")?;
    writeln!(out, "From:        {}", describe(&plan.origin))?;
    writeln!(out, "To:          {}", describe(&plan.destination))?;
    writeln!(out, "Distance:    {:.1} km (straight line)", plan.distance_km)?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<16} {:>10} {:>9} {:>9} {:>8} {:>10}",
        "Variant", "Distance", "Minutes", "Fuel (L)", "Tolls", "Total"
    )?;
    writeln!(out, "{}", "-".repeat(67))?;
    for estimate in &plan.options {
        let marker = if estimate.variant_kind == plan.chosen { "*" } else { " " };
        writeln!(
            out,
            "{marker}{:<15} {:>7.1} km {:>9} {:>9.1} {:>8.2} {:>10.2}",
            estimate.variant_kind.label(),
            estimate.distance_km,
            estimate.duration_minutes(),
            estimate.fuel_liters,
            estimate.toll_cost,
            estimate.total_cost
        )?;
    }
    writeln!(out)?;
    writeln!(out, "* {}", plan.chosen_route().variant_kind.road_preference())?;
    write!(out, "Navigation:  {}", plan.navigation_url)?;

    Ok(out)
}

pub fn render_place(output_format: OutputFormat, place: &Place) -> Result<String> {
    if output_format == OutputFormat::Json {
        return serde_json::to_string_pretty(place).context("Failed to serialize place");
    }

    let mut out = String::new();
    writeln!(out, "Query:       {}", place.raw_query)?;
    if let Some(name) = &place.display_name {
        writeln!(out, "Name:        {name}")?;
    }
    if let Some(coordinate) = place.resolved_coordinate {
        writeln!(out, "Coordinates: {}", coordinate.format_coordinates())?;
    }
    write!(out, "Source:      {}", place.source)?;
    Ok(out)
}

fn describe(place: &Place) -> String {
    match place.resolved_coordinate {
        Some(coordinate) => format!("{} ({})", place.label(), coordinate.format_coordinates()),
        None => place.label().to_string(),
    }
}
