use crate::monitor::Alert;

/// A titled table of rows, e.g. one row per URI section with its current rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub header: Vec<String>,
    pub data: Vec<Vec<String>>,
}

/// A titled series of values, e.g. total request rate over the render window.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub title: String,
    pub data: Vec<f64>,
}

/// What gets handed to the renderer on each render tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub tables: Vec<Table>,
    pub graphs: Vec<Graph>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.graphs.is_empty()
    }
}

/// Receives `Summary` values and `Alert` events. A full implementation might
/// draw a multi-pane terminal dashboard; this crate ships only a
/// line-oriented stdout renderer, enough to run the binary end to end.
pub trait Sink: Send {
    fn render(&mut self, summary: &Summary);
    fn alert(&mut self, alert: &Alert);
}

/// A [`Sink`] that writes plain lines to stdout.
#[derive(Default)]
pub struct StdoutPrinter;

impl Sink for StdoutPrinter {
    fn render(&mut self, summary: &Summary) {
        if summary.is_empty() {
            println!("(no data yet)");
            return;
        }
        for table in &summary.tables {
            println!("== {} ==", table.title);
            println!("{}", table.header.join("\t"));
            for row in &table.data {
                println!("{}", row.join("\t"));
            }
        }
        for graph in &summary.graphs {
            println!(
                "-- {} -- {:?}",
                graph.title,
                graph.data.iter().map(|v| format!("{v:.3}")).collect::<Vec<_>>()
            );
        }
    }

    fn alert(&mut self, alert: &Alert) {
        println!(
            "[alert] {} is {:?} (current={:.3}, threshold={:.3})",
            alert.name, alert.status, alert.current, alert.threshold
        );
    }
}
