use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, info};

use crate::config::ExplorerConfig;
use crate::schema::{Schema, SchemaError, SchemaSource, load_schema};

mod graph;
mod render_utils;
mod ui;

use graph::GraphView;

type LoadResult = Result<Schema, SchemaError>;

pub struct SchemaExplorerApp {
    source: SchemaSource,
    config: ExplorerConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DetailTab {
    Overview,
    Details,
    Diagrams,
    Graph,
}

impl DetailTab {
    const ALL: [(Self, &'static str); 4] = [
        (Self::Overview, "Overview"),
        (Self::Details, "Details"),
        (Self::Diagrams, "Diagrams"),
        (Self::Graph, "Graph"),
    ];
}

struct ViewModel {
    schema: Schema,
    revision: u64,
    selected: Option<String>,
    search: String,
    dark_mode: bool,
    tab: DetailTab,
    config: ExplorerConfig,
    live_physics: bool,
    graph_view: GraphView,
}

fn describe_error(error: SchemaError) -> String {
    let error = anyhow::Error::new(error);
    error!("{error:#}");
    format!("{error:#}")
}

impl SchemaExplorerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: SchemaSource,
        config: ExplorerConfig,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: SchemaSource) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(load_schema(&source));
        });

        rx
    }

    fn start_load(source: SchemaSource) -> AppState {
        info!(%source, "loading schema");
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready(&self, result: LoadResult) -> AppState {
        match result {
            Ok(schema) => AppState::Ready(Box::new(ViewModel::new(schema, self.config))),
            Err(error) => AppState::Error(describe_error(error)),
        }
    }
}

impl eframe::App for SchemaExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        self.state =
                            AppState::Error("Background load worker disconnected".to_owned());
                        return;
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading schema...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load schema");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.source.clone());
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    info!(source = %self.source, "reloading schema");
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(schema)) => model.replace_schema(schema),
                        Ok(Err(error)) => {
                            self.state = AppState::Error(describe_error(error));
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            self.state =
                                AppState::Error("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready(result);
        }
    }
}
