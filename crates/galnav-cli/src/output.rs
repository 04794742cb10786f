//! Rendering of resolved routes.

use std::io::{self, Write};

use clap::ValueEnum;

use galnav_lib::{QueryGroup, QueryType, RouteDetailsEvent, Waypoint};

use crate::terminal::{format_with_separators, ColorPalette};

/// Output format for resolved routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tagged route listing.
    #[default]
    Text,
    /// The full event as pretty-printed JSON.
    Json,
}

/// What the event's `count` measures for a query type.
pub fn count_label(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::Route => "stops",
        QueryType::Update => "stops remaining",
        QueryType::Cancel => "route cleared",
        _ => match query_type.group() {
            Some(QueryGroup::Galaxy) | Some(QueryGroup::Carrier) => "jumps",
            Some(QueryGroup::Services) => "ls from arrival",
            _ => "missions",
        },
    }
}

pub fn render_event<W: Write>(
    out: &mut W,
    event: &RouteDetailsEvent,
    format: OutputFormat,
    palette: &ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, event)?;
            writeln!(out)
        }
        OutputFormat::Text => render_text(out, event, palette),
    }
}

fn render_text<W: Write>(out: &mut W, event: &RouteDetailsEvent, p: &ColorPalette) -> io::Result<()> {
    let target = match (&event.system, &event.station) {
        (Some(system), Some(station)) => format!("{system} / {}{station}{}", p.orange, p.reset),
        (Some(system), None) => system.clone(),
        _ => "-".to_string(),
    };
    writeln!(
        out,
        "{}: {}{target}{} ({} {})",
        event.query_type,
        p.white_bold,
        p.reset,
        format_with_separators(event.count),
        count_label(event.query_type)
    )?;

    let next = event.route.waypoints.iter().position(|wp| !wp.visited);
    let last = event.route.len().saturating_sub(1);
    for (index, waypoint) in event.route.waypoints.iter().enumerate() {
        let (tag, color) = if waypoint.visited {
            ("HERE", p.tag_here)
        } else if index == last {
            ("GOAL", p.tag_goal)
        } else if Some(index) == next {
            ("NEXT", p.tag_next)
        } else {
            ("STOP", p.tag_stop)
        };
        writeln!(
            out,
            "  {color}{tag}{} {:<28} {}{:>9.2} ly{}{}",
            p.reset,
            waypoint.system_name,
            p.gray,
            waypoint.distance_travelled.unwrap_or_default(),
            p.reset,
            annotations(waypoint, p)
        )?;
    }

    if event.route.len() > 1 {
        writeln!(
            out,
            "{}Total: {:.2} ly{}",
            p.gray,
            event.route.total_distance(),
            p.reset
        )?;
    }
    if let Some(tour) = event.tour_distance {
        writeln!(out, "{}Circuit: {tour:.2} ly{}", p.gray, p.reset)?;
    }
    Ok(())
}

fn annotations(waypoint: &Waypoint, p: &ColorPalette) -> String {
    let mut notes = Vec::new();
    if !waypoint.mission_ids.is_empty() {
        let ids: Vec<String> = waypoint.mission_ids.iter().map(i64::to_string).collect();
        notes.push(format!("{}missions {}{}", p.green, ids.join(","), p.reset));
    }
    if let Some(station) = &waypoint.station_name {
        notes.push(format!("{}{station}{}", p.orange, p.reset));
    }
    if waypoint.has_neutron_star {
        notes.push("neutron".to_string());
    }
    if waypoint.is_scoopable {
        notes.push("scoopable".to_string());
    }
    if notes.is_empty() {
        String::new()
    } else {
        format!("  {}", notes.join("  "))
    }
}

/// List every query type with its group.
pub fn render_query_types<W: Write>(out: &mut W) -> io::Result<()> {
    for query_type in QueryType::ALL {
        let group = match query_type.group() {
            Some(QueryGroup::Galaxy) => "galaxy",
            Some(QueryGroup::Missions) => "missions",
            Some(QueryGroup::Services) => "services",
            Some(QueryGroup::Carrier) => "carrier",
            None => "route",
        };
        writeln!(out, "{:<14} {group}", query_type.as_str())?;
    }
    Ok(())
}
