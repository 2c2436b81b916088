use anyhow::{anyhow, bail, Result};
use plotters::prelude::*;

use crate::models::PriceBar;

const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 800;

/// Render a two-panel price/volume chart to a PNG file.
///
/// The upper panel takes two thirds of the height and draws the close-price
/// line; the lower third draws volume bars. Bars are plotted by index so
/// overnight and weekend gaps do not stretch the x axis.
pub fn render_price_chart(
    bars: &[PriceBar],
    symbol: &str,
    period_label: &str,
    intraday: bool,
    path: &str,
) -> Result<()> {
    if bars.is_empty() {
        bail!("No data available to plot");
    }

    let labels: Vec<String> = bars
        .iter()
        .map(|bar| {
            if intraday {
                bar.timestamp.format("%H:%M").to_string()
            } else {
                bar.timestamp.format("%Y-%m-%d").to_string()
            }
        })
        .collect();
    let label_for = |x: &i32| -> String {
        labels
            .get(*x as usize)
            .cloned()
            .unwrap_or_default()
    };

    let min_close = bars.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);
    let max_close = bars.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max);
    let pad = ((max_close - min_close) * 0.05).max(0.01);
    let max_volume = bars.iter().map(|b| b.volume).max().unwrap_or(0) as f64;

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow!("chart rendering failed: {}", e))?;
    let (price_area, volume_area) = root.split_vertically((CHART_HEIGHT * 2 / 3) as i32);

    let x_span = 0..bars.len() as i32;

    let mut price_chart = ChartBuilder::on(&price_area)
        .caption(
            format!("{} Stock Price ({})", symbol, period_label),
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_span.clone(), (min_close - pad)..(max_close + pad))
        .map_err(|e| anyhow!("chart rendering failed: {}", e))?;

    price_chart
        .configure_mesh()
        .y_desc("Price ($)")
        .x_labels(10)
        .x_label_formatter(&label_for)
        .draw()
        .map_err(|e| anyhow!("chart rendering failed: {}", e))?;

    price_chart
        .draw_series(LineSeries::new(
            bars.iter()
                .enumerate()
                .map(|(i, bar)| (i as i32, bar.close)),
            &BLUE,
        ))
        .map_err(|e| anyhow!("chart rendering failed: {}", e))?
        .label("Close Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    price_chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| anyhow!("chart rendering failed: {}", e))?;

    let mut volume_chart = ChartBuilder::on(&volume_area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_span, 0.0..max_volume.max(1.0) * 1.05)
        .map_err(|e| anyhow!("chart rendering failed: {}", e))?;

    volume_chart
        .configure_mesh()
        .y_desc("Volume")
        .x_labels(10)
        .x_label_formatter(&label_for)
        .draw()
        .map_err(|e| anyhow!("chart rendering failed: {}", e))?;

    let volume_color = RGBColor(127, 127, 127).mix(0.5);
    volume_chart
        .draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let x = i as i32;
            Rectangle::new([(x, 0.0), (x + 1, bar.volume as f64)], volume_color.filled())
        }))
        .map_err(|e| anyhow!("chart rendering failed: {}", e))?;

    root.present()
        .map_err(|e| anyhow!("chart rendering failed: {}", e))?;
    Ok(())
}
