//! Client pull-script template.
//!
//! Every chart on the dashboard carries a small script that polls its view
//! route once per interval and appends the returned point, trimming the
//! series to `max_points`. The script is a template with `{{name}}`
//! placeholders:
//!
//! | placeholder      | value                                   |
//! |------------------|-----------------------------------------|
//! | `{{view_id}}`    | JS-safe chart identifier                |
//! | `{{interval}}`   | pull period in milliseconds             |
//! | `{{max_points}}` | points kept per series                  |
//! | `{{addr}}`       | advertised server address (`link_addr`) |
//! | `{{route}}`      | viewer route name                       |
//! | `{{prefix}}`     | mount prefix of the HTTP surface        |

use crate::error::ConfigError;

/// Default pull script, using `fetch` so the page needs no extra libraries.
pub const DEFAULT_TEMPLATE: &str = r#"
(function () {
    const chart = statsview_charts["{{view_id}}"];
    function sync() {
        fetch("http://{{addr}}{{prefix}}/view/{{route}}")
            .then(function (resp) { return resp.json(); })
            .then(function (result) {
                const opt = chart.getOption();
                let x = opt.xAxis[0].data;
                x.push(result.time);
                if (x.length > {{max_points}}) {
                    x = x.slice(1);
                }
                opt.xAxis[0].data = x;
                for (let i = 0; i < result.values.length; i++) {
                    let y = opt.series[i].data;
                    y.push({ value: result.values[i] });
                    if (y.length > {{max_points}}) {
                        y = y.slice(1);
                    }
                    opt.series[i].data = y;
                }
                chart.setOption(opt);
            })
            .catch(function () {});
    }
    setInterval(sync, {{interval}});
})();
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ViewId,
    Interval,
    MaxPoints,
    Addr,
    Route,
    Prefix,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "view_id" => Some(Self::ViewId),
            "interval" => Some(Self::Interval),
            "max_points" => Some(Self::MaxPoints),
            "addr" => Some(Self::Addr),
            "route" => Some(Self::Route),
            "prefix" => Some(Self::Prefix),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Field),
}

/// Values substituted into a [`PullTemplate`].
#[derive(Debug, Clone)]
pub struct TemplateVars<'a> {
    pub view_id: &'a str,
    pub interval_ms: u128,
    pub max_points: usize,
    pub addr: &'a str,
    pub route: &'a str,
    pub prefix: &'a str,
}

/// A parsed pull-script template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullTemplate {
    segments: Vec<Segment>,
}

impl PullTemplate {
    /// Parse a template, rejecting unterminated or unknown placeholders.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                return Err(ConfigError::Template(format!(
                    "unterminated placeholder at byte {}",
                    source.len() - rest.len() + open
                )));
            };
            let name = after[..close].trim();
            let Some(field) = Field::from_name(name) else {
                return Err(ConfigError::Template(format!(
                    "unknown placeholder {{{{{name}}}}}"
                )));
            };
            segments.push(Segment::Field(field));
            rest = &after[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, vars: &TemplateVars<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(Field::ViewId) => out.push_str(vars.view_id),
                Segment::Field(Field::Interval) => out.push_str(&vars.interval_ms.to_string()),
                Segment::Field(Field::MaxPoints) => out.push_str(&vars.max_points.to_string()),
                Segment::Field(Field::Addr) => out.push_str(vars.addr),
                Segment::Field(Field::Route) => out.push_str(vars.route),
                Segment::Field(Field::Prefix) => out.push_str(vars.prefix),
            }
        }
        out
    }
}
