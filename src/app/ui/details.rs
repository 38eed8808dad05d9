use eframe::egui::{self, RichText, Ui};
use orbit_graph::engine::display_name;
use orbit_graph::{GraphLink, GraphNode};

use super::super::{Inspected, ViewModel};

/// A connection of the inspected node, as listed in the details panel.
struct ConnectionRow {
    id: String,
    name: String,
    verified: u32,
    pending: u32,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        let inspected = self.inspected.borrow().clone();
        match inspected {
            Some(Inspected::Node(node)) => self.draw_node_details(ui, &node),
            Some(Inspected::Edge(link)) => self.draw_link_details(ui, &link),
            None => {
                ui.label("Click a node or a connection in the graph.");
            }
        }

        ui.separator();
        self.draw_payload_summary(ui);
    }

    fn draw_node_details(&mut self, ui: &mut Ui, node: &GraphNode) {
        ui.label(RichText::new(display_name(node)).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Strength: {}", node.strength));
        let mix = node.status_mix;
        ui.label(format!(
            "Receipts: {} verified, {} pending, {} rejected, {} unclear",
            mix.verified, mix.pending, mix.rejected, mix.unclear
        ));
        if let Some(stats) = node.interaction_stats {
            ui.label(format!("Gave: {}  Received: {}", stats.sent, stats.received));
        }
        if let Some(connected_at) = &node.connected_at {
            ui.label(format!("Connected: {connected_at}"));
        }
        if let Some(last_interaction) = &node.last_interaction {
            ui.label(format!("Last interaction: {last_interaction}"));
        }
        if !node.top_tags.is_empty() {
            ui.label(format!("Tags: {}", node.top_tags.join(", ")));
        }

        ui.separator();
        ui.label(RichText::new("Connections").strong());
        let connections = self.connections_of(&node.id);
        if connections.is_empty() {
            ui.label("No connections in the current graph.");
            return;
        }

        let mut select = None;
        egui::ScrollArea::vertical()
            .id_salt("connections_scroll")
            .max_height(320.0)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for row in &connections {
                    let label = format!(
                        "{}  ({} verified, {} pending)",
                        row.name, row.verified, row.pending
                    );
                    if ui.link(label).on_hover_text(row.id.as_str()).clicked() {
                        select = Some(row.id.clone());
                    }
                }
            });

        if let Some(id) = select
            && let Some(body) = self.simulation.body(&id)
        {
            let node = body.node().clone();
            self.simulation.select(Some(&node.id));
            *self.inspected.borrow_mut() = Some(Inspected::Node(node));
        }
    }

    fn draw_link_details(&self, ui: &mut Ui, link: &GraphLink) {
        let name_of = |id: &str| {
            self.simulation
                .body(id)
                .map(|body| display_name(body.node()).to_owned())
                .unwrap_or_else(|| id.to_owned())
        };

        let title = format!("{} - {}", name_of(&link.source), name_of(&link.target));
        ui.label(RichText::new(title).strong());
        ui.add_space(6.0);
        ui.label(format!("Verified: {}", link.verified_count));
        ui.label(format!("Pending: {}", link.pending_count));
        ui.label(format!("Unclear: {}", link.unclear_count));
        ui.label(format!(
            "{} gave {}, received {}",
            name_of(&link.source),
            link.sent_count,
            link.received_count
        ));
    }

    fn draw_payload_summary(&self, ui: &mut Ui) {
        let report = &self.last_report;
        ui.label(RichText::new("Last payload").strong());
        if let Some(error) = &self.reload_error {
            ui.colored_label(ui.visuals().error_fg_color, format!("Reload failed: {error}"));
            ui.label("Showing the previous payload.");
        }
        ui.label(format!(
            "{} nodes and {} links received",
            self.node_count, self.link_count
        ));
        if report.deferred {
            ui.label("Waiting for the graph area to be measured.");
            return;
        }
        if let Some(change) = report.change {
            ui.label(format!(
                "{change:?} update: {} new, {} updated, {} removed",
                report.created,
                report.updated,
                report.evicted.len()
            ));
        }
        if report.issues.is_empty() {
            return;
        }

        ui.label(format!("{} entries skipped:", report.issues.len()));
        for issue in report.issues.iter().take(12) {
            ui.small(issue.to_string());
        }
        if report.issues.len() > 12 {
            ui.small(format!("... and {} more", report.issues.len() - 12));
        }
    }

    fn connections_of(&self, id: &str) -> Vec<ConnectionRow> {
        let mut rows = self
            .simulation
            .edges()
            .iter()
            .filter_map(|edge| {
                let other = edge.link().other_end(id)?;
                let body = self.simulation.body(other)?;
                Some(ConnectionRow {
                    id: other.to_owned(),
                    name: display_name(body.node()).to_owned(),
                    verified: edge.link().verified_count,
                    pending: edge.link().pending_count,
                })
            })
            .collect::<Vec<_>>();

        rows.sort_by(|a, b| b.verified.cmp(&a.verified).then_with(|| a.name.cmp(&b.name)));
        rows
    }
}
