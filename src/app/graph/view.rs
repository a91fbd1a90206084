use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use health_graph::{NodeStyle, ViewEvent};

use crate::util::{short_name, symptom_lines};

use super::super::render_utils::{
    SELECTED_COLOR, blend_color, dim_color, draw_background, draw_edge, draw_pie, with_opacity,
    world_to_screen,
};
use super::super::{SearchMatchCache, ViewModel};

const SEARCH_DIM: f32 = 0.4;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn health_summary(style: &NodeStyle) -> String {
    if style.segments.is_empty() {
        return "no health data".to_owned();
    }
    style
        .segments
        .iter()
        .map(|segment| format!("{} {:.0}%", segment.category, segment.proportion * 100.0))
        .collect::<Vec<_>>()
        .join("  ")
}

impl ViewModel {
    fn screen_space(&self, rect: Rect) -> (Vec<Pos2>, Vec<f32>) {
        let scale = self.zoom.powf(0.6);
        self.canvas
            .nodes()
            .iter()
            .map(|node| {
                (
                    world_to_screen(rect, self.pan, self.zoom, node.world_pos),
                    (node.radius * scale).clamp(4.0, 64.0),
                )
            })
            .unzip()
    }

    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.revision == self.canvas.revision()
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .canvas
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                fuzzy_match_score(&matcher, &node.style.label, query).is_some()
                    || fuzzy_match_score(&matcher, short_name(&node.id), query).is_some()
            })
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            revision: self.canvas.revision(),
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_graph_zoom(ui, rect, &response);

        if self.canvas.nodes().is_empty() {
            self.handle_graph_drag(&response, None);
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The graph has no nodes.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        }

        let (mut screen_positions, mut screen_radii) = self.screen_space(rect);
        let mut visible = Self::visible_indices(rect, &screen_positions, &screen_radii);
        let hovered = Self::hovered_index(ui, &visible, &screen_positions, &screen_radii);

        self.handle_graph_drag(&response, hovered);
        if response.dragged() {
            (screen_positions, screen_radii) = self.screen_space(rect);
            visible = Self::visible_indices(rect, &screen_positions, &screen_radii);
            ui.ctx().request_repaint();
        }

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let search_matches = self.search_matches();
        let dimmed = |index: usize| {
            search_matches
                .as_ref()
                .is_some_and(|matches| !matches.contains(&index))
        };

        let zoom_sqrt = self.zoom.sqrt();
        let mut visible_mask = vec![false; screen_positions.len()];
        for &index in &visible {
            visible_mask[index] = true;
        }

        let mut visible_edge_count = 0usize;
        for edge in self.canvas.edges() {
            if edge.source == edge.target
                || (!visible_mask[edge.source] && !visible_mask[edge.target])
            {
                continue;
            }

            let style = &edge.style;
            let base = if style.highlighted {
                SELECTED_COLOR
            } else if style.redirected {
                Color32::from_rgb(150, 160, 182)
            } else {
                Color32::from_rgb(124, 130, 142)
            };
            let mut color = with_opacity(base, style.opacity);
            if dimmed(edge.source) && dimmed(edge.target) {
                color = dim_color(color, SEARCH_DIM);
            }

            draw_edge(
                &painter,
                screen_positions[edge.source],
                screen_radii[edge.source],
                screen_positions[edge.target],
                screen_radii[edge.target],
                style.curve,
                (style.width * 0.5 * zoom_sqrt).clamp(1.0, 8.0),
                color,
                style.arrow,
            );
            visible_edge_count += 1;
        }
        self.visible_edge_count = visible_edge_count;
        self.visible_node_count = visible.len();

        // Selected nodes last so their halo and detail sit on top.
        visible.sort_by_key(|&index| self.canvas.nodes()[index].style.selected);

        let mut selection_animating = false;
        for &index in &visible {
            let node = &self.canvas.nodes()[index];
            let style = &node.style;
            let position = screen_positions[index];
            let radius = screen_radii[index];
            let is_hovered = hovered == Some(index);
            let tint = if dimmed(index) { SEARCH_DIM } else { 1.0 };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("node-selection", node.id.as_str())),
                style.selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }

            if selection_mix > 0.0 {
                let halo_alpha = (40.0 + selection_mix * 150.0) as u8;
                painter.circle_stroke(
                    position,
                    radius + 5.0 + ((1.0 - selection_mix) * 6.0),
                    Stroke::new(
                        1.5 + selection_mix * 1.5,
                        Color32::from_rgba_unmultiplied(245, 206, 93, halo_alpha),
                    ),
                );
            }

            draw_pie(&painter, position, radius, &style.segments, tint);

            if style.collapsed {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(1.4, Color32::from_gray(210)),
                );
                let badge = position + vec2(radius * 0.75, -radius * 0.75);
                painter.circle_filled(badge, 9.0, Color32::from_rgb(70, 110, 170));
                painter.text(
                    badge,
                    Align2::CENTER_CENTER,
                    format!("+{}", style.hidden_descendants),
                    FontId::proportional(10.0),
                    Color32::WHITE,
                );
            } else if style.compound {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(1.0, Color32::from_rgba_unmultiplied(200, 200, 200, 90)),
                );
            }

            let outline = if is_hovered {
                Color32::from_rgb(255, 164, 101)
            } else {
                blend_color(Color32::from_rgba_unmultiplied(15, 15, 15, 190), SELECTED_COLOR, selection_mix)
            };
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0 + selection_mix * 1.2, outline),
            );

            if radius > 9.0 || is_hovered || style.selected {
                painter.text(
                    position + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    &style.label,
                    FontId::proportional(12.0),
                    dim_color(Color32::from_gray(236), tint),
                );
            }

            if !style.detail.is_empty() {
                let text = symptom_lines(&style.detail).join("\n");
                let galley = painter.layout_no_wrap(
                    text,
                    FontId::proportional(11.5),
                    Color32::from_gray(240),
                );
                let origin = position + vec2(radius + 10.0, -galley.size().y * 0.5);
                let frame = Rect::from_min_size(origin, galley.size()).expand(4.0);
                painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(30, 34, 42, 225));
                painter.galley(origin, galley, Color32::from_gray(240));
            }
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(index) = hovered {
            let node = &self.canvas.nodes()[index];
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}", node.style.label, health_summary(&node.style)),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        let hovered_id = hovered.map(|index| self.canvas.nodes()[index].id.clone());
        if response.double_clicked() {
            if let Some(id) = hovered_id {
                self.canvas.push_event(ViewEvent::NodeDoubleClicked(id));
            }
        } else if response.clicked() {
            self.canvas.push_event(match hovered_id {
                Some(id) => ViewEvent::NodeClicked(id),
                None => ViewEvent::BackgroundClicked,
            });
        }

        if self.canvas.has_events() {
            ui.ctx().request_repaint();
        }
    }
}
