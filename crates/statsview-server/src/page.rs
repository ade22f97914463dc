//! Server-rendered dashboard page.
//!
//! One ECharts line chart per viewer. Each chart gets its option object
//! inline and a pull script rendered from [`Config::template`], which polls
//! the viewer's route and appends the returned point.

use serde_json::json;
use statsview_core::{ChartSpec, Config, ConfigError, PullTemplate, TemplateVars, Theme};

use crate::PREFIX;

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #fafafa; }
.container { display: flex; flex-wrap: wrap; justify-content: space-around; padding: 12px; }
.item { width: 600px; height: 400px; margin: 12px; background: #fff; }
"#;

/// ECharts option for one chart, with empty series the pull script fills.
fn chart_option(chart: &ChartSpec) -> serde_json::Value {
    let series: Vec<serde_json::Value> = chart
        .series
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "type": "line",
                "smooth": true,
                "showSymbol": false,
                "data": [],
            })
        })
        .collect();

    json!({
        "title": { "text": chart.title, "left": "center" },
        "tooltip": { "trigger": "axis" },
        "legend": { "data": chart.series, "top": 28 },
        "xAxis": [{ "type": "category", "boundaryGap": false, "name": "Time", "data": [] }],
        "yAxis": [{ "type": "value", "name": chart.y_axis }],
        "dataZoom": [{ "type": "slider", "start": 0, "end": 100 }],
        "series": series,
    })
}

/// The westeros palette. The ECharts package on the CDN ships no script for
/// it, so the page registers it inline.
fn westeros_theme() -> serde_json::Value {
    let axis = json!({
        "axisLine": { "show": true, "lineStyle": { "color": "#cccccc" } },
        "axisTick": { "show": false },
        "axisLabel": { "show": true, "color": "#999999" },
        "splitLine": { "show": true, "lineStyle": { "color": ["#eeeeee"] } },
    });
    json!({
        "color": ["#516b91", "#59c4e6", "#edafda", "#93b7e3", "#a5e7f0", "#cbb0e3"],
        "backgroundColor": "rgba(0,0,0,0)",
        "title": {
            "textStyle": { "color": "#516b91" },
            "subtextStyle": { "color": "#93b7e3" },
        },
        "line": {
            "itemStyle": { "borderWidth": 2 },
            "lineStyle": { "width": 2 },
            "symbolSize": 6,
            "symbol": "emptyCircle",
            "smooth": true,
        },
        "categoryAxis": axis,
        "valueAxis": axis,
        "legend": { "textStyle": { "color": "#999999" } },
        "tooltip": {
            "axisPointer": {
                "lineStyle": { "color": "#cccccc", "width": 1 },
                "crossStyle": { "color": "#cccccc", "width": 1 },
            },
        },
        "dataZoom": {
            "backgroundColor": "rgba(255,255,255,0)",
            "dataBackgroundColor": "rgba(222,222,222,1)",
            "fillerColor": "rgba(114,230,212,0.25)",
            "handleColor": "#cccccc",
            "textStyle": { "color": "#999999" },
        },
    })
}

/// Script tag that makes `theme` available to `echarts.init`.
fn theme_script(theme: Theme, assets: &str) -> String {
    match theme {
        Theme::Macarons => format!("<script src=\"{assets}theme/macarons.js\"></script>\n"),
        Theme::Westeros => format!(
            "<script>echarts.registerTheme(\"westeros\", {});</script>\n",
            script_safe(&westeros_theme().to_string())
        ),
    }
}

/// Make JSON safe to inline inside a `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Render the full dashboard for `charts`, in order.
pub fn render_page(config: &Config, charts: &[ChartSpec]) -> Result<String, ConfigError> {
    let template = PullTemplate::parse(&config.template)?;
    let assets = if config.assets_host.ends_with('/') {
        config.assets_host.clone()
    } else {
        format!("{}/", config.assets_host)
    };
    let theme = config.theme.as_str();

    let mut page = String::with_capacity(4096 + charts.len() * 2048);
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str("<title>Statsview</title>\n");
    page.push_str(&format!("<script src=\"{assets}dist/echarts.min.js\"></script>\n"));
    page.push_str(&theme_script(config.theme, &assets));
    page.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

    page.push_str("<div class=\"container\">\n");
    for chart in charts {
        page.push_str(&format!("<div class=\"item\" id=\"{}\"></div>\n", chart.id));
    }
    page.push_str("</div>\n<script>\nconst statsview_charts = {};\n");

    for chart in charts {
        let id = &chart.id;
        let option = script_safe(&chart_option(chart).to_string());
        page.push_str(&format!(
            "statsview_charts[\"{id}\"] = echarts.init(document.getElementById(\"{id}\"), \"{theme}\");\n"
        ));
        page.push_str(&format!("statsview_charts[\"{id}\"].setOption({option});\n"));
        page.push_str(&template.render(&TemplateVars {
            view_id: id,
            interval_ms: config.interval.as_millis(),
            max_points: config.max_points,
            addr: &config.link_addr,
            route: &chart.route,
            prefix: PREFIX,
        }));
        page.push('\n');
    }

    page.push_str("</script>\n</body>\n</html>\n");
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charts() -> Vec<ChartSpec> {
        vec![
            ChartSpec::new("threads", "Threads", "Count", &["Threads"]),
            ChartSpec::new("heap", "Heap", "Size / MiB", &["HeapInUse"]),
        ]
    }

    #[test]
    fn test_page_has_one_div_per_chart() {
        let page = render_page(&Config::default(), &charts()).unwrap();
        assert!(page.contains("<title>Statsview</title>"));
        assert!(page.contains("id=\"statsview_threads\""));
        assert!(page.contains("id=\"statsview_heap\""));
        assert!(page.find("statsview_threads").unwrap() < page.find("statsview_heap").unwrap());
    }

    #[test]
    fn test_page_loads_assets_and_theme() {
        let config = Config::default()
            .with_assets_host("http://assets.local/echarts")
            .with_theme(Theme::Westeros);
        let page = render_page(&config, &charts()).unwrap();
        assert!(page.contains("http://assets.local/echarts/dist/echarts.min.js"));
        assert!(page.contains("\"westeros\");"));
    }

    #[test]
    fn test_westeros_theme_is_registered_inline() {
        let config = Config::default().with_theme(Theme::Westeros);
        let page = render_page(&config, &charts()).unwrap();
        let register = page
            .find("echarts.registerTheme(\"westeros\"")
            .expect("westeros theme registered");
        assert!(register > page.find("dist/echarts.min.js").unwrap());
        assert!(register < page.find("echarts.init(").unwrap());
        assert!(page.contains("#516b91"));
        assert!(!page.contains("theme/westeros.js"));
    }

    #[test]
    fn test_macarons_theme_loads_from_assets() {
        let page = render_page(&Config::default(), &charts()).unwrap();
        assert!(page.contains("theme/macarons.js"));
        assert!(!page.contains("registerTheme"));
    }

    #[test]
    fn test_pull_scripts_use_link_addr_and_interval() {
        let config = Config::default()
            .with_addr("0.0.0.0:9000")
            .with_link_addr("dash.local:9000")
            .with_interval(std::time::Duration::from_millis(750))
            .with_max_points(12);
        let page = render_page(&config, &charts()).unwrap();
        assert!(page.contains("http://dash.local:9000/debug/statsview/view/heap"));
        assert!(page.contains("http://dash.local:9000/debug/statsview/view/threads"));
        assert!(page.contains("setInterval(sync, 750)"));
        assert!(page.contains("x.length > 12"));
        assert!(!page.contains("0.0.0.0"));
    }

    #[test]
    fn test_chart_option_shape() {
        let option = chart_option(&charts()[1]);
        assert_eq!(option["title"]["text"], "Heap");
        assert_eq!(option["yAxis"][0]["name"], "Size / MiB");
        assert_eq!(option["series"][0]["name"], "HeapInUse");
        assert_eq!(option["series"][0]["type"], "line");
        assert_eq!(option["dataZoom"][0]["type"], "slider");
    }

    #[test]
    fn test_script_close_tag_is_escaped() {
        let chart = ChartSpec::new("x", "</script><b>", "y", &["s"]);
        let page = render_page(&Config::default(), &[chart]).unwrap();
        assert!(!page.contains("</script><b>"));
        assert!(page.contains("<\\/script><b>"));
    }

    #[test]
    fn test_custom_template_is_used() {
        let config = Config::default().with_template("/* pull {{route}} every {{interval}} */");
        let page = render_page(&config, &charts()).unwrap();
        assert!(page.contains("/* pull heap every 2000 */"));
        assert!(!page.contains("fetch("));
    }

    #[test]
    fn test_bad_template_is_an_error() {
        let config = Config::default().with_template("{{oops}}");
        assert!(matches!(
            render_page(&config, &charts()),
            Err(ConfigError::Template(_))
        ));
    }
}
