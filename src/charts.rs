//! Rendering ECharts charts built with [charming].
//!
//! A page renders the chart containers with [charts_view] and adds the
//! ECharts library plus the output of [charts_script] to its head elements.

use charming::Chart;
use maud::{Markup, PreEscaped, html};

use crate::html::HeadElement;

/// The path to the ECharts library in the static directory.
pub const ECHARTS_SCRIPT: &str = "/static/echarts.6.0.0.min.js";

/// A chart with its HTML container ID and ECharts configuration.
pub struct PageChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl PageChart {
    pub fn new(id: &'static str, chart: &Chart) -> Self {
        Self {
            id,
            options: chart.to_string(),
        }
    }
}

/// Renders the HTML containers for `charts`.
pub fn charts_view(charts: &[PageChart]) -> Markup {
    html!(
        section class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[320px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// The head elements that load ECharts and initialise `charts` once the page has loaded.
///
/// Charts follow the browser's dark mode setting and resize with the window.
pub fn charts_head_elements(charts: &[PageChart]) -> Vec<HeadElement> {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    );

    vec![
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        HeadElement::ScriptSource(PreEscaped(wrapped_script)),
    ]
}
