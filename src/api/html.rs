//! Server-rendered pages for the dashboard read paths.

use chrono::{DateTime, FixedOffset, Utc};

use crate::{
    db::models::{Fridge, LogEntry, Reading},
    history::pagination::{Page, PageWindow},
};

use super::dto::RECORD_TIME_FORMAT;

/// Escape text for use in element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

pub fn fridge_list(fridges: &[Fridge]) -> String {
    let mut body = String::from("<h1>Fridges</h1>\n");
    if fridges.is_empty() {
        body.push_str("<p>No fridges registered.</p>\n");
        return layout("Fridges", &body);
    }

    body.push_str("<ul class=\"fridges\">\n");
    for f in fridges {
        body.push_str(&format!(
            "<li><a href=\"/fridges/{}\">{}</a>",
            f.id,
            escape(&f.name)
        ));
        if let Some(location) = &f.location {
            body.push_str(&format!(" <span class=\"location\">{}</span>", escape(location)));
        }
        if let Some(image) = &f.image {
            body.push_str(&format!(
                " <img src=\"{}\" alt=\"{}\" height=\"64\">",
                escape(image),
                escape(&f.name)
            ));
        }
        body.push_str("</li>\n");
    }
    body.push_str("</ul>\n");
    layout("Fridges", &body)
}

pub fn fridge_history(
    fridge: &Fridge,
    page: &Page<Reading>,
    filter: &Filter<'_>,
    tz: FixedOffset,
) -> String {
    let title = format!("History: {}", fridge.name);
    let mut body = format!("<h1>{}</h1>\n", escape(&fridge.name));
    if let Some(location) = &fridge.location {
        body.push_str(&format!("<p class=\"location\">{}</p>\n", escape(location)));
    }
    body.push_str(&filter_form(&format!("/fridges/{}", fridge.id), filter));

    body.push_str(
        "<table>\n<tr><th>Time</th><th>Sensor 1</th><th>Sensor 2</th>\
         <th>Humidity</th><th>Air</th><th>Out of range</th></tr>\n",
    );
    for r in &page.items {
        body.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row_class(r.is_out_of_range),
            local_time(r.event_date, tz),
            celsius(Some(r.sensor1_temp)),
            celsius(Some(r.sensor2_temp)),
            percent(r.humidity),
            celsius(r.air_temp),
            yes_no(r.is_out_of_range),
        ));
    }
    body.push_str("</table>\n");
    body.push_str(&pager(&page.window, filter.query));
    layout(&title, &body)
}

pub fn daily_log(page: &Page<LogEntry>, filter: &Filter<'_>, tz: FixedOffset) -> String {
    let mut body = String::from("<h1>Daily temperatures</h1>\n");
    body.push_str(&filter_form("/daily", filter));
    log_table(&mut body, &page.items, tz);
    body.push_str(&pager(&page.window, filter.query));
    layout("Daily temperatures", &body)
}

pub fn emergency_log(page: &Page<LogEntry>, filter: &Filter<'_>, tz: FixedOffset) -> String {
    let mut body = String::from("<h1>Emergencies</h1>\n");
    body.push_str(&filter_form("/emergencies", filter));
    if page.items.is_empty() {
        body.push_str("<p>No out-of-range readings.</p>\n");
    } else {
        log_table(&mut body, &page.items, tz);
    }
    body.push_str(&pager(&page.window, filter.query));
    layout("Emergencies", &body)
}

/// Date filter as shown in the form, plus the query fragment that keeps it
/// across page links.
#[derive(Debug, Clone, Copy)]
pub struct Filter<'a> {
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub query: &'a str,
}

fn log_table(body: &mut String, entries: &[LogEntry], tz: FixedOffset) {
    body.push_str(
        "<table>\n<tr><th>Time</th><th>Fridge</th><th>Sensor 1</th><th>Sensor 2</th>\
         <th>Humidity</th><th>Air</th><th>Out of range</th></tr>\n",
    );
    for e in entries {
        body.push_str(&format!(
            "<tr{}><td>{}</td><td><a href=\"/fridges/{}\">{}</a></td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row_class(e.is_out_of_range),
            local_time(e.event_date, tz),
            e.fridge_id,
            escape(&e.fridge_name),
            celsius(Some(e.sensor1_temp)),
            celsius(Some(e.sensor2_temp)),
            percent(e.humidity),
            celsius(e.air_temp),
            yes_no(e.is_out_of_range),
        ));
    }
    body.push_str("</table>\n");
}

fn filter_form(action: &str, filter: &Filter<'_>) -> String {
    format!(
        "<form method=\"get\" action=\"{}\">\n\
         <label>From <input type=\"date\" name=\"start_date\" value=\"{}\"></label>\n\
         <label>To <input type=\"date\" name=\"end_date\" value=\"{}\"></label>\n\
         <button type=\"submit\">Filter</button>\n</form>\n",
        escape(action),
        escape(filter.start_date),
        escape(filter.end_date),
    )
}

/// Previous/next links plus "Page X of Y". `query` is appended to every link.
fn pager(window: &PageWindow, query: &str) -> String {
    let link = |number: i64, label: &str| {
        let href = if query.is_empty() {
            format!("?page={number}")
        } else {
            format!("?page={number}&{query}")
        };
        format!("<a href=\"{}\">{}</a>", escape(&href), label)
    };

    let mut out = String::from("<nav class=\"pager\">");
    if window.has_previous() {
        out.push_str(&link(1, "&laquo; first"));
        out.push(' ');
        out.push_str(&link(window.number - 1, "previous"));
        out.push(' ');
    }
    out.push_str(&format!(
        "<span class=\"current\">Page {} of {} ({} records)</span>",
        window.number, window.num_pages, window.total
    ));
    if window.has_next() {
        out.push(' ');
        out.push_str(&link(window.number + 1, "next"));
        out.push(' ');
        out.push_str(&link(window.num_pages, "last &raquo;"));
    }
    out.push_str("</nav>\n");
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>tr.alarm td {{ color: #b00; font-weight: bold; }}</style>\n</head>\n<body>\n\
         <nav><a href=\"/fridges\">Fridges</a> | <a href=\"/daily\">Daily</a> | \
         <a href=\"/emergencies\">Emergencies</a></nav>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

fn row_class(alarm: bool) -> &'static str {
    if alarm {
        " class=\"alarm\""
    } else {
        ""
    }
}

fn local_time(instant: DateTime<Utc>, tz: FixedOffset) -> String {
    instant.with_timezone(&tz).format(RECORD_TIME_FORMAT).to_string()
}

fn celsius(value: Option<f64>) -> String {
    value.map_or_else(|| "—".to_owned(), |v| format!("{v:.1} °C"))
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "—".to_owned(), |v| format!("{v:.1} %"))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(number: i64, num_pages: i64) -> PageWindow {
        PageWindow {
            number,
            num_pages,
            per_page: 20,
            total: num_pages * 20,
        }
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<b>"Fish" & 'Chips'</b>"#),
            "&lt;b&gt;&quot;Fish&quot; &amp; &#x27;Chips&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape("Freezer 2"), "Freezer 2");
    }

    #[test]
    fn fridge_names_are_escaped_in_the_list() {
        let html = fridge_list(&[Fridge {
            id: 4,
            name: "<script>".to_owned(),
            location: Some("Bar & Grill".to_owned()),
            image: None,
        }]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Bar &amp; Grill"));
        assert!(html.contains("href=\"/fridges/4\""));
    }

    #[test]
    fn pager_keeps_the_filter_query() {
        let html = pager(&window(2, 3), "start_date=2025-03-01&end_date=2025-03-02");
        assert!(html.contains("?page=1&amp;start_date=2025-03-01&amp;end_date=2025-03-02"));
        assert!(html.contains("?page=3&amp;start_date=2025-03-01"));
        assert!(html.contains("Page 2 of 3"));
    }

    #[test]
    fn pager_without_neighbours_has_no_links() {
        let html = pager(&window(1, 1), "");
        assert!(!html.contains("<a "));
        assert!(html.contains("Page 1 of 1"));
    }

    #[test]
    fn log_rows_render_one_line_per_entry() {
        use chrono::TimeZone;

        let entry = |sensor1_temp: f64, is_out_of_range: bool| LogEntry {
            id: uuid::Uuid::new_v4(),
            fridge_id: 7,
            fridge_name: "Dairy".to_owned(),
            sensor1_temp,
            sensor2_temp: 4.0,
            humidity: Some(55.0),
            air_temp: None,
            is_out_of_range,
            event_date: Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 0).unwrap(),
        };
        let utc = FixedOffset::east_opt(0).unwrap();

        let mut body = String::new();
        log_table(&mut body, &[entry(12.0, true), entry(3.0, false)], utc);

        let rows: Vec<&str> = body.lines().filter(|l| l.starts_with("<tr")).collect();
        assert_eq!(rows.len(), 3, "header plus two entries");
        assert!(rows[1].starts_with("<tr class=\"alarm\">"));
        assert!(rows[1].contains("<td>2025-03-07 09:05</td>"));
        assert!(rows[1].contains("<a href=\"/fridges/7\">Dairy</a>"));
        assert!(rows[1].contains("<td>12.0 °C</td>"));
        assert!(rows[2].starts_with("<tr><td>"));
        assert!(rows[2].ends_with("<td>no</td></tr>"));
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(celsius(None), "—");
        assert_eq!(celsius(Some(-18.26)), "-18.3 °C");
        assert_eq!(percent(Some(55.0)), "55.0 %");
    }
}
