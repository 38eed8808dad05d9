use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use eframe::egui::{self, Align, Context, Layout};
use orbit_graph::{ConfigError, Filter, GraphPayload, LayoutConfig, Simulation, Viewport};

use super::super::{Inspected, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(
        payload: &GraphPayload,
        config: LayoutConfig,
        filter: Filter,
    ) -> Result<Self, ConfigError> {
        let inspected = Rc::new(RefCell::new(None));
        let mut simulation = Simulation::new(config)?;

        let node_sink = Rc::clone(&inspected);
        simulation.set_on_node_click(move |node| {
            *node_sink.borrow_mut() = Some(Inspected::Node(node.clone()));
        });
        let edge_sink = Rc::clone(&inspected);
        simulation.set_on_edge_click(move |link| {
            *edge_sink.borrow_mut() = Some(Inspected::Edge(link.clone()));
        });
        simulation.set_filter(filter);

        // The graph area has not been measured yet; the first frame releases it.
        let last_report = simulation.reconcile(payload, Viewport::UNMEASURED);

        Ok(Self {
            simulation,
            search: String::new(),
            inspected,
            last_report,
            reload_error: None,
            node_count: payload.nodes.len(),
            link_count: payload.links.len(),
        })
    }

    pub(in crate::app) fn reload_failed(&mut self, error: String) {
        self.reload_error = Some(error);
    }

    pub(in crate::app) fn reload(&mut self, payload: &GraphPayload) {
        let viewport = self.simulation.viewport();
        self.last_report = self.simulation.reconcile(payload, viewport);
        self.reload_error = None;
        self.node_count = payload.nodes.len();
        self.link_count = payload.links.len();

        let stale = match &*self.inspected.borrow() {
            Some(Inspected::Node(node)) => self.simulation.body(&node.id).is_none(),
            Some(Inspected::Edge(link)) => !self
                .simulation
                .edges()
                .iter()
                .any(|edge| edge.link().source == link.source && edge.link().target == link.target),
            None => false,
        };
        if stale {
            self.inspected.borrow_mut().take();
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        payload_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("orbit-graph");
                    ui.separator();
                    ui.label(format!("payload: {}", payload_path.display()));
                    ui.label(format!("nodes: {}", self.simulation.bodies().len()));
                    ui.label(format!("edges: {}", self.simulation.edges().len()));

                    let has_anchor = self.simulation.anchor().is_some();
                    let center_button =
                        ui.add_enabled(has_anchor, egui::Button::new("Center on me"));
                    if center_button.clicked() {
                        self.simulation.center_on_user();
                    }

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload payload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.separator();
                    let mut filter = self.simulation.filter();
                    egui::ComboBox::from_id_salt("filter")
                        .selected_text(filter.label())
                        .show_ui(ui, |ui| {
                            for option in Filter::ALL {
                                ui.selectable_value(&mut filter, option, option.label());
                            }
                        });
                    self.simulation.set_filter(filter);

                    let search = ui.add(
                        egui::TextEdit::singleline(&mut self.search)
                            .hint_text("Search names")
                            .desired_width(180.0),
                    );
                    if search.changed() {
                        self.simulation.set_search(&self.search);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_loading {
                            ui.spinner();
                        }
                        if let Some(error) = &self.reload_error {
                            ui.colored_label(ui.visuals().error_fg_color, "Reload failed")
                                .on_hover_text(error.as_str());
                        }
                        ui.label(format!("{:?}", self.simulation.energy_state()));
                    });
                });
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}
