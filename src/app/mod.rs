use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context as _;
use eframe::egui::{self, Context};
use orbit_graph::{
    ConfigError, Filter, GraphLink, GraphNode, GraphPayload, LayoutConfig, ReconcileReport,
    Simulation,
};

mod graph;
mod render_utils;
mod ui;

pub struct OrbitApp {
    payload_path: PathBuf,
    config: LayoutConfig,
    filter: Filter,
    state: AppState,
    reload_rx: Option<Receiver<Result<GraphPayload, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<GraphPayload, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// Whatever the click handlers last reported.
#[derive(Clone, Debug)]
enum Inspected {
    Node(GraphNode),
    Edge(GraphLink),
}

struct ViewModel {
    simulation: Simulation,
    search: String,
    inspected: Rc<RefCell<Option<Inspected>>>,
    last_report: ReconcileReport,
    /// Set when the latest reload failed; the previous layout stays on screen.
    reload_error: Option<String>,
    node_count: usize,
    link_count: usize,
}

const WORKER_GONE: &str = "Background load worker disconnected";

fn load_payload(path: &Path) -> anyhow::Result<GraphPayload> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read payload {}", path.display()))?;
    GraphPayload::from_json(&text)
        .with_context(|| format!("failed to parse payload {}", path.display()))
}

fn config_failure(error: &ConfigError) -> String {
    format!("invalid layout config: {error}")
}

impl OrbitApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        payload_path: PathBuf,
        config: LayoutConfig,
        filter: Filter,
    ) -> Self {
        let state = Self::start_load(payload_path.clone());
        Self {
            payload_path,
            config,
            filter,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(payload_path: PathBuf) -> Receiver<Result<GraphPayload, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_payload(&payload_path).map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                tracing::warn!(%error, "payload load failed");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(payload_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(payload_path),
        }
    }
}

impl eframe::App for OrbitApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(payload) => {
                                match ViewModel::new(&payload, self.config, self.filter) {
                                    Ok(model) => AppState::Ready(Box::new(model)),
                                    Err(error) => AppState::Error(config_failure(&error)),
                                }
                            }
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(WORKER_GONE.to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph payload...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load graph payload");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.payload_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.payload_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.payload_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        // Reloads reconcile into the live simulation so bodies keep their places.
                        Ok(Ok(payload)) => model.reload(&payload),
                        Ok(Err(error)) => model.reload_failed(error),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.reload_failed(WORKER_GONE.to_owned());
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
