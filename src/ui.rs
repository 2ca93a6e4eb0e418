//! Terminal renderer for a [`CalendarView`]

use crate::engine::{CalendarView, ColumnContent, DayColumn};
use crate::projection::CalendarEvent;
use crate::range::Granularity;
use crate::time::{Locale, hour_labels};
use chrono::NaiveDate;
use crossterm::{
    cursor, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

const TIME_LABEL_WIDTH: u16 = 6;
const HEADER_ROWS: u16 = 2;
const FOOTER_ROWS: u16 = 2;

pub struct RenderState<'a> {
    pub width: u16,
    pub height: u16,
    pub locale: Locale,
    pub status_message: Option<&'a str>,
}

pub fn render(out: &mut impl Write, view: &CalendarView, state: &RenderState) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), cursor::Hide)?;

    render_header(out, view, state)?;
    match view.granularity {
        Granularity::Month => render_month(out, view, state)?,
        Granularity::Day | Granularity::Week => render_time_grid(out, view, state)?,
    }
    render_footer(out, state)?;

    out.flush()
}

fn render_header(out: &mut impl Write, view: &CalendarView, state: &RenderState) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        SetAttribute(Attribute::Bold),
        Print(truncate_str(&format!(" {}", view.title), state.width as usize)),
        ResetColor,
        SetAttribute(Attribute::Reset)
    )?;

    if view.show_today_button {
        let label = format!("[t] {}", state.locale.today_label());
        let x = state.width.saturating_sub(label.chars().count() as u16 + 1);
        queue!(
            out,
            cursor::MoveTo(x, 0),
            SetForegroundColor(Color::Blue),
            Print(label),
            ResetColor
        )?;
    }
    Ok(())
}

fn render_footer(out: &mut impl Write, state: &RenderState) -> io::Result<()> {
    let status_row = state.height.saturating_sub(2);
    if let Some(msg) = state.status_message {
        queue!(
            out,
            cursor::MoveTo(0, status_row),
            SetForegroundColor(Color::Yellow),
            Print(format!(" {}", truncate_str(msg, state.width.saturating_sub(2) as usize))),
            ResetColor
        )?;
    }

    queue!(
        out,
        cursor::MoveTo(0, state.height.saturating_sub(1)),
        SetForegroundColor(Color::DarkGrey),
        Print(" h/l:prev/next t:today d/w/m:view 1-9:open q:quit"),
        ResetColor
    )
}

fn render_month(out: &mut impl Write, view: &CalendarView, state: &RenderState) -> io::Result<()> {
    let cell_width = (state.width.saturating_sub(1) / 7).max(4);
    let grid_height = state.height.saturating_sub(HEADER_ROWS + FOOTER_ROWS + 1);
    let cell_height = (grid_height / 6).max(2);

    for (col, column) in view.columns.iter().take(7).enumerate() {
        queue!(
            out,
            cursor::MoveTo(1 + col as u16 * cell_width, HEADER_ROWS),
            SetForegroundColor(Color::DarkGrey),
            Print(column.weekday_label),
            ResetColor
        )?;
    }

    for (i, column) in view.columns.iter().enumerate() {
        let x = 1 + (i % 7) as u16 * cell_width;
        let y = HEADER_ROWS + 1 + (i / 7) as u16 * cell_height;
        render_month_cell(out, column, view.anchor, x, y, cell_width, cell_height, state.locale)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn render_month_cell(
    out: &mut impl Write,
    column: &DayColumn,
    anchor: NaiveDate,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    locale: Locale,
) -> io::Result<()> {
    queue!(out, cursor::MoveTo(x, y))?;
    if column.date == anchor {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    } else if column.is_today {
        queue!(out, SetForegroundColor(Color::Green), SetAttribute(Attribute::Bold))?;
    } else if !column.in_current_month || column.is_weekend {
        queue!(out, SetForegroundColor(Color::DarkGrey))?;
    }
    queue!(out, Print(format!("{:>2}", column.day_label)), ResetColor, SetAttribute(Attribute::Reset))?;

    let text_width = width.saturating_sub(1) as usize;
    let mut row = y + 1;
    let last_row = y + height.saturating_sub(1);

    for event in column.events() {
        if row > last_row {
            break;
        }
        let line = if event.start_time.is_empty() {
            event.title.to_string()
        } else {
            format!("{} {}", event.start_time, event.title)
        };
        queue!(
            out,
            cursor::MoveTo(x, row),
            SetForegroundColor(event_color(event)),
            Print(truncate_str(&line, text_width)),
            ResetColor
        )?;
        row += 1;
    }

    let overflow = column.overflow_count();
    if overflow > 0 && row <= last_row {
        queue!(
            out,
            cursor::MoveTo(x, row),
            SetForegroundColor(Color::DarkGrey),
            Print(truncate_str(&locale.more_label(overflow), text_width)),
            ResetColor
        )?;
    }
    Ok(())
}

fn render_time_grid(out: &mut impl Write, view: &CalendarView, state: &RenderState) -> io::Result<()> {
    let top = HEADER_ROWS + 1;
    let rows = state.height.saturating_sub(top + FOOTER_ROWS).max(1);
    let columns = view.columns.len().max(1) as u16;
    let col_width = (state.width.saturating_sub(TIME_LABEL_WIDTH) / columns).max(4);

    for (col, column) in view.columns.iter().enumerate() {
        let x = TIME_LABEL_WIDTH + col as u16 * col_width;
        let color = if column.is_today {
            Color::Blue
        } else if column.is_weekend {
            Color::DarkGrey
        } else {
            Color::Reset
        };
        queue!(
            out,
            cursor::MoveTo(x, HEADER_ROWS),
            SetForegroundColor(color),
            Print(truncate_str(
                &format!("{} {}", column.weekday_label, column.day_label),
                col_width.saturating_sub(1) as usize
            )),
            ResetColor
        )?;
    }

    let mut last_label_row = None;
    for (hour, label) in hour_labels().into_iter().enumerate() {
        let row = percent_to_row(hour as f64 / 24.0 * 100.0, rows);
        if let Some(label) = label
            && last_label_row != Some(row)
        {
            queue!(
                out,
                cursor::MoveTo(0, top + row),
                SetForegroundColor(Color::DarkGrey),
                Print(label),
                ResetColor
            )?;
            last_label_row = Some(row);
        }
    }

    if let (Some(percent), Some(col)) = (view.indicator_percent, view.today_column()) {
        let x = TIME_LABEL_WIDTH + col as u16 * col_width;
        let line: String = "\u{2500}".repeat(col_width.saturating_sub(1) as usize);
        queue!(
            out,
            cursor::MoveTo(x, top + percent_to_row(percent, rows)),
            SetForegroundColor(Color::Red),
            Print(line),
            ResetColor
        )?;
    }

    for (col, column) in view.columns.iter().enumerate() {
        let ColumnContent::Timed(events) = &column.content else {
            continue;
        };
        let x = TIME_LABEL_WIDTH + col as u16 * col_width;
        let text_width = col_width.saturating_sub(1) as usize;
        let numbered = column.date == view.anchor;

        for (i, positioned) in events.iter().enumerate() {
            let start_row = percent_to_row(positioned.placement.top_percent, rows);
            let span = percent_to_span(positioned.placement.height_percent, rows);
            let event = &positioned.event;
            let title = if numbered && i < 9 {
                format!("{} {}", i + 1, event.title)
            } else {
                event.title.to_string()
            };

            for offset in 0..span {
                let row = start_row + offset;
                if row >= rows {
                    break;
                }
                let text = match offset {
                    0 => title.clone(),
                    1 => event.time_label(),
                    _ => String::new(),
                };
                queue!(
                    out,
                    cursor::MoveTo(x, top + row),
                    SetForegroundColor(event_color(event)),
                    SetAttribute(Attribute::Reverse),
                    Print(pad_str(&text, text_width)),
                    SetAttribute(Attribute::Reset),
                    ResetColor
                )?;
            }
        }
    }
    Ok(())
}

/// Row within a `rows`-tall grid for a percent offset
pub fn percent_to_row(percent: f64, rows: u16) -> u16 {
    let row = (percent.clamp(0.0, 100.0) / 100.0 * rows as f64).floor() as u16;
    row.min(rows.saturating_sub(1))
}

/// Rows a box of `percent` height covers, at least one
pub fn percent_to_span(percent: f64, rows: u16) -> u16 {
    ((percent.max(0.0) / 100.0 * rows as f64).round() as u16).max(1)
}

fn event_color(event: &CalendarEvent) -> Color {
    parse_hex_color(event.color).unwrap_or(Color::Blue)
}

/// "#RRGGBB" to a terminal color
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.trim().strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(Color::Rgb { r, g, b })
}

pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

fn pad_str(s: &str, width: usize) -> String {
    let truncated = truncate_str(s, width);
    let len = truncated.chars().count();
    format!("{}{}", truncated, " ".repeat(width.saturating_sub(len)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Planning", 10), "Planning");
        assert_eq!(truncate_str("Quarterly planning", 8), "Quarter…");
        assert_eq!(truncate_str("Встреча", 4), "Вст…");
    }

    #[test]
    fn test_pad_str() {
        assert_eq!(pad_str("ab", 4), "ab  ");
        assert_eq!(pad_str("abcdef", 4), "abc…");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#3B82F6"),
            Some(Color::Rgb { r: 0x3B, g: 0x82, b: 0xF6 })
        );
        assert_eq!(parse_hex_color("3B82F6"), None);
        assert_eq!(parse_hex_color("#3B82"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }

    #[test]
    fn test_percent_to_row() {
        assert_eq!(percent_to_row(0.0, 24), 0);
        assert_eq!(percent_to_row(37.5, 24), 9);
        assert_eq!(percent_to_row(100.0, 24), 23);
        assert_eq!(percent_to_row(-5.0, 24), 0);
    }

    #[test]
    fn test_percent_to_span() {
        assert_eq!(percent_to_span(2.0, 24), 1);
        assert_eq!(percent_to_span(25.0, 24), 6);
        assert_eq!(percent_to_span(0.0, 24), 1);
    }

    #[test]
    fn test_render_month_writes_cells() {
        use crate::clock::FixedClock;
        use crate::config::Config;
        use crate::engine::CalendarEngine;
        use crate::records::Task;
        use std::sync::Arc;

        let now = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let engine = CalendarEngine::new(Arc::new(FixedClock::new(now)), &Config::default());
        let tasks = vec![Task::new("t1", "Dentist").scheduled("2024-03-10", Some("09:00"))];
        let view = engine.view(now.date(), Granularity::Month, &tasks, &[]);

        let mut buffer = Vec::new();
        let state = RenderState {
            width: 100,
            height: 40,
            locale: Locale::English,
            status_message: Some("loaded"),
        };
        render(&mut buffer, &view, &state).unwrap();

        let output = String::from_utf8_lossy(&buffer);
        assert!(output.contains("March 2024"));
        assert!(output.contains("09:00 Dentist"));
        assert!(output.contains("loaded"));
    }
}
