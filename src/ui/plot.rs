use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, HPlacement, Legend, Line, Plot, Points};

use crate::color::{ranked_bar_colors, PM10_SERIES, PM25_SERIES};
use crate::data::ranking::RankedStations;
use crate::data::yearly::YearMean;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Yearly trend (line chart)
// ---------------------------------------------------------------------------

/// PM2.5 and PM10 by year for the selected station.
pub fn trend_section(ui: &mut Ui, state: &AppState) {
    ui.heading("Air Quality Trend");

    let Some(view) = &state.view else {
        ui.label("No station selected.");
        return;
    };

    ui.label(RichText::new(format!("{} Air Pollution", view.station)).strong());

    let series = |f: fn(&YearMean) -> f64| -> Vec<[f64; 2]> {
        view.trend
            .iter()
            .map(|p| [p.year as f64, f(&p.mean)])
            .filter(|[_, y]| !y.is_nan())
            .collect()
    };
    let pm25 = series(|m: &YearMean| m.pm25);
    let pm10 = series(|m: &YearMean| m.pm10);

    Plot::new("trend_plot")
        .legend(Legend::default())
        .height(320.0)
        .y_axis_label("PM2.5/PM10")
        .x_axis_formatter(year_tick)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (name, color, points) in [("PM2.5", PM25_SERIES, pm25), ("PM10", PM10_SERIES, pm10)] {
                plot_ui.line(Line::new(points.clone()).name(name).color(color).width(3.0));
                plot_ui.points(Points::new(points).name(name).color(color).radius(4.0));
            }
        });
}

fn year_tick(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    if mark.value.fract() == 0.0 {
        format!("{:.0}", mark.value)
    } else {
        String::new()
    }
}

// ---------------------------------------------------------------------------
// Station rankings (horizontal bar charts)
// ---------------------------------------------------------------------------

/// One bar of a ranked chart.
#[derive(Debug, Clone, PartialEq)]
struct BarSpec {
    /// Position on the category axis; the top-ranked station is highest.
    position: f64,
    /// Bar length; negative when the chart grows leftwards.
    value: f64,
    station: String,
    color: Color32,
}

fn bar_layout(ranked: &RankedStations, mirrored: bool) -> Vec<BarSpec> {
    let sign = if mirrored { -1.0 } else { 1.0 };
    let pollutant = ranked.key.pollutant();
    let n = ranked.len();
    ranked
        .entries
        .iter()
        .zip(ranked_bar_colors(n))
        .enumerate()
        .map(|(rank, (entry, color))| BarSpec {
            position: (n - 1 - rank) as f64,
            value: sign * entry.mean(pollutant),
            station: entry.station.clone(),
            color,
        })
        .collect()
}

/// Both station rankings side by side.
pub fn ranking_section(ui: &mut Ui, state: &AppState) {
    ui.heading("Air Quality by Station");

    let Some(report) = &state.report else {
        return;
    };
    if report.by_pm25.is_empty() {
        ui.label("No stations.");
        return;
    }

    // The PM10 chart grows leftwards so the two rankings face each other.
    ui.columns(2, |cols: &mut [Ui]| {
        ranked_chart(&mut cols[0], &report.by_pm25, false);
        ranked_chart(&mut cols[1], &report.by_pm10, true);
    });
}

fn magnitude_tick(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    format!("{}", mark.value.abs())
}

fn ranked_chart(ui: &mut Ui, ranked: &RankedStations, mirrored: bool) {
    ui.label(RichText::new(format!("Average {} by Station", ranked.key)).strong());

    let specs = bar_layout(ranked, mirrored);
    let labels: Vec<(f64, String)> = specs.iter().map(|s| (s.position, s.station.clone())).collect();
    let bars: Vec<Bar> = specs
        .into_iter()
        .filter(|s| !s.value.is_nan())
        .map(|s| {
            Bar::new(s.position, s.value)
                .name(&s.station)
                .fill(s.color)
                .width(0.7)
        })
        .collect();

    let mut plot = Plot::new(format!("ranking_{}", ranked.key))
        .height(360.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_grid([true, false])
        .x_axis_label(ranked.key.to_string())
        .x_axis_formatter(magnitude_tick)
        .y_axis_formatter(move |mark, _range| {
            labels
                .iter()
                .find(|(pos, _)| *pos == mark.value)
                .map(|(_, name)| name.clone())
                .unwrap_or_default()
        });
    if mirrored {
        plot = plot.y_axis_position(HPlacement::Right);
    }

    plot.show(ui, |plot_ui| {
        let chart = BarChart::new(bars)
            .horizontal()
            .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
                format!("{}\n{:.2}", bar.name, bar.value.abs())
            }));
        plot_ui.bar_chart(chart);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Dataset, Record};
    use crate::data::ranking::{rank_stations, RankKey};

    #[test]
    fn top_station_is_drawn_highest_and_red() {
        let ds = Dataset::from_records(vec![
            Record::new("Low", 2013, [1.0; 6]),
            Record::new("High", 2013, [9.0; 6]),
            Record::new("Mid", 2013, [5.0; 6]),
        ]);
        let specs = bar_layout(&rank_stations(&ds, RankKey::Pm25), false);

        let stations: Vec<&str> = specs.iter().map(|s| s.station.as_str()).collect();
        assert_eq!(stations, vec!["High", "Mid", "Low"]);
        let positions: Vec<f64> = specs.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![2.0, 1.0, 0.0]);
        assert_eq!(specs[0].color, ranked_bar_colors(3)[0]);
        assert_eq!(specs[0].value, 9.0);
    }

    #[test]
    fn mirrored_chart_grows_leftwards_with_positive_ticks() {
        let ds = Dataset::from_records(vec![
            Record::new("Low", 2013, [1.0; 6]),
            Record::new("High", 2013, [9.0; 6]),
        ]);
        let specs = bar_layout(&rank_stations(&ds, RankKey::Pm10), true);
        assert_eq!(specs[0].station, "High");
        assert_eq!(specs[0].position, 1.0);
        assert_eq!(specs[0].value, -9.0);

        let mark = GridMark { value: -40.0, step_size: 10.0 };
        assert_eq!(magnitude_tick(mark, &(-100.0..=0.0)), "40");
    }

    #[test]
    fn year_ticks_only_on_whole_years() {
        let mark = |value| GridMark { value, step_size: 0.5 };
        assert_eq!(year_tick(mark(2015.0), &(2013.0..=2017.0)), "2015");
        assert_eq!(year_tick(mark(2015.5), &(2013.0..=2017.0)), "");
    }
}
