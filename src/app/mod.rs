pub mod loader;

use std::sync::Arc;

use anyhow::Result;
use eframe::{
    egui::{self, Color32},
    App, Frame,
};
use image::DynamicImage;

use crate::{
    archive::{export_zip, DEFAULT_ARCHIVE_NAME},
    config::Settings,
    crop::{CropChoice, CropPreset, CropRectangle, CropTarget, MAX_TARGET_SIDE},
    display::{DisplayPreset, DisplayTransform},
    image_utils::{make_preview, resample_crop, to_color_image, ResampleFilter},
    selection::{DeleteReport, SelectionSet, Toggle},
    session::{Direction, ImageRef, SessionState},
    store::{CropStore, OutputDir},
    zoom::ZoomFactor,
};

use self::loader::Loader;

const CROP_PREVIEW_EDGE: f32 = 256.0;

#[derive(Default)]
pub struct KeyboardState {
    pub next_image: bool,
    pub prev_image: bool,
    pub save_crop: bool,
}

struct CropResult {
    source_stem: String,
    rect: CropRectangle,
    image: DynamicImage,
    texture: egui::TextureHandle,
}

pub struct ImagePrepApp {
    session: SessionState,
    selection: SelectionSet,
    store: OutputDir,
    loader: Loader,
    filter: ResampleFilter,
    display_preset: DisplayPreset,
    preset: Option<CropPreset>,
    custom_width: i64,
    custom_height: i64,
    zoom_slider: f64,
    original: Option<Arc<DynamicImage>>,
    transform: Option<DisplayTransform>,
    texture: Option<egui::TextureHandle>,
    crop: Option<CropResult>,
    outputs: Vec<String>,
    status: String,
}

impl ImagePrepApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings, images: Vec<ImageRef>) -> Result<Self> {
        let store = OutputDir::open(&settings.output_dir, settings.format, settings.quality)?;
        let mut session = settings.session();
        session.load(images);

        let target = settings.target;
        let preset = CropPreset::ALL
            .into_iter()
            .find(|p| CropTarget::from(*p) == target);

        let mut app = Self {
            session,
            selection: SelectionSet::new(),
            store,
            loader: Loader::new(),
            filter: settings.filter,
            display_preset: settings.display,
            preset,
            custom_width: target.width as i64,
            custom_height: target.height as i64,
            zoom_slider: ZoomFactor::DEFAULT.get(),
            original: None,
            transform: None,
            texture: None,
            crop: None,
            outputs: Vec::new(),
            status: String::from("Ready"),
        };
        app.refresh_outputs();
        app.load_current(&cc.egui_ctx);
        Ok(app)
    }

    fn load_current(&mut self, ctx: &egui::Context) {
        self.crop = None;
        self.zoom_slider = self.session.zoom().get();

        let Some(image_ref) = self.session.current().cloned() else {
            self.original = None;
            self.transform = None;
            self.texture = None;
            self.status = "No images loaded".into();
            return;
        };

        let loaded = self.session.display_transform().and_then(|transform| {
            let original = self.loader.load(image_ref.path())?;
            let preview = make_preview(&original, transform.display_size)?;
            Ok((original, preview, transform))
        });

        match loaded {
            Ok((original, preview, transform)) => {
                if transform.is_scaled() {
                    log::debug!(
                        "Previewing {} at {}x{}",
                        image_ref.path().display(),
                        transform.display_size.0,
                        transform.display_size.1
                    );
                }
                let color_image = to_color_image(&preview);
                if let Some(texture) = self.texture.as_mut() {
                    texture.set(color_image, egui::TextureOptions::LINEAR);
                } else {
                    self.texture = Some(ctx.load_texture(
                        "imageprep-current",
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
                self.original = Some(original);
                self.transform = Some(transform);
                self.status = image_status(&self.session, &transform);
            }
            Err(err) => {
                log::warn!("{err}");
                self.original = None;
                self.transform = None;
                self.texture = None;
                self.status = format!("Skipped {}: {err}", image_ref.path().display());
            }
        }

        if let Some(idx) = self.session.current_index() {
            if let Some(next) = self.session.images().get((idx + 1) % self.session.len()) {
                if next.path() != image_ref.path() && !self.loader.contains(next.path()) {
                    self.loader.preload(next.path().to_path_buf());
                }
            }
        }
    }

    fn navigate(&mut self, direction: Direction, ctx: &egui::Context) {
        match self.session.navigate(direction) {
            Ok(_) => self.load_current(ctx),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn select(&mut self, index: usize, ctx: &egui::Context) {
        match self.session.select(index) {
            Ok(()) => self.load_current(ctx),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn apply_crop_choice(&mut self, choice: CropChoice) {
        self.status = match self.session.set_crop_target(choice) {
            Ok(target) => format!("Crop size set to {target}"),
            Err(err) => err.to_string(),
        };
    }

    fn handle_click(&mut self, click: (f64, f64), ctx: &egui::Context) {
        let (Some(original), Some(image_ref)) = (self.original.clone(), self.session.current().cloned()) else {
            self.status = "No image loaded".into();
            return;
        };
        let target = self.session.crop_target();
        let result = self.session.resolve_click(click).and_then(|rect| {
            let cropped = resample_crop(&original, rect, target, self.filter)?;
            Ok((rect, cropped))
        });

        match result {
            Ok((rect, image)) => {
                let texture = ctx.load_texture(
                    "imageprep-crop",
                    to_color_image(&image),
                    egui::TextureOptions::LINEAR,
                );
                self.status = crop_status(target, rect, self.session.zoom());
                self.crop = Some(CropResult {
                    source_stem: image_ref.stem(),
                    rect,
                    image,
                    texture,
                });
            }
            Err(err) => self.status = format!("Error cropping image: {err}"),
        }
    }

    fn save_crop(&mut self) {
        let Some(crop) = &self.crop else {
            self.status = "No cropped image to save".into();
            return;
        };
        self.status = match self.store.write(&crop.source_stem, &crop.image) {
            Ok(id) => format!("Saved as {id}"),
            Err(err) => err.to_string(),
        };
        self.refresh_outputs();
    }

    fn refresh_outputs(&mut self) {
        match self.store.list() {
            Ok(ids) => {
                self.selection.retain_existing(&ids);
                self.outputs = ids;
            }
            Err(err) => {
                self.status = format!("Unable to list {}: {err}", self.store.dir().display());
            }
        }
    }

    fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            self.status = "No files selected for deletion".into();
            return;
        }
        let report = self.selection.apply_delete(&mut self.store);
        self.status = delete_status(&report);
        self.refresh_outputs();
    }

    fn export(&mut self) {
        let destination = self.store.dir().with_file_name(DEFAULT_ARCHIVE_NAME);
        self.status = match export_zip(&self.store, &destination) {
            Ok(count) => format!("Created {} with {count} images", destination.display()),
            Err(err) => format!("{err:#}"),
        };
    }

    fn handle_keyboard(ctx: &egui::Context) -> KeyboardState {
        if ctx.wants_keyboard_input() {
            return KeyboardState::default();
        }
        ctx.input(|input| KeyboardState {
            next_image: input.key_pressed(egui::Key::Space) || input.key_pressed(egui::Key::ArrowRight),
            prev_image: input.key_pressed(egui::Key::Backspace) || input.key_pressed(egui::Key::ArrowLeft),
            save_crop: input.key_pressed(egui::Key::Enter),
        })
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("Crop settings");

        let mut display = self.display_preset;
        egui::ComboBox::from_label("Display size")
            .selected_text(display.label())
            .show_ui(ui, |ui| {
                for preset in DisplayPreset::ALL {
                    ui.selectable_value(&mut display, preset, preset.label());
                }
            });
        if display != self.display_preset {
            self.display_preset = display;
            self.session.set_display(display.spec());
            self.load_current(ctx);
        }

        let mut preset = self.preset;
        let selected_text = preset.map(CropPreset::label).unwrap_or_else(|| "Custom".into());
        egui::ComboBox::from_label("Crop size")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for choice in CropPreset::ALL {
                    ui.selectable_value(&mut preset, Some(choice), choice.label());
                }
                ui.selectable_value(&mut preset, None, "Custom");
            });
        if preset != self.preset {
            self.preset = preset;
            if let Some(choice) = preset {
                self.apply_crop_choice(CropChoice::Preset(choice));
            }
        }
        if self.preset.is_none() {
            ui.horizontal(|ui| {
                ui.label("W");
                ui.add(egui::DragValue::new(&mut self.custom_width).range(1..=MAX_TARGET_SIDE as i64));
                ui.label("H");
                ui.add(egui::DragValue::new(&mut self.custom_height).range(1..=MAX_TARGET_SIDE as i64));
            });
            if ui.button("Apply").clicked() {
                self.apply_crop_choice(CropChoice::Custom {
                    width: self.custom_width,
                    height: self.custom_height,
                });
            }
        }
        ui.label(format!("Output: {}", self.session.crop_target()));

        ui.separator();
        let zoom = ui.add(
            egui::Slider::new(&mut self.zoom_slider, ZoomFactor::MIN..=ZoomFactor::MAX)
                .step_by(0.1)
                .text("Zoom"),
        );
        if zoom.changed() {
            match self.session.set_zoom(self.zoom_slider) {
                Ok(zoom) => {
                    self.zoom_slider = zoom.get();
                    self.status = format!("Zoom: {:.1}x", zoom.get());
                }
                Err(err) => self.status = err.to_string(),
            }
        }
        let (sample_w, sample_h) = self.session.sample_size();
        ui.label(format!("Sampling {sample_w}x{sample_h} px"));

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("◀ Prev").clicked() {
                self.navigate(Direction::Prev, ctx);
            }
            if ui.button("Next ▶").clicked() {
                self.navigate(Direction::Next, ctx);
            }
        });

        ui.separator();
        ui.label(format!("Images ({})", self.session.len()));
        let current = self.session.current_index();
        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("gallery")
            .show(ui, |ui| {
                for (idx, image) in self.session.images().iter().enumerate() {
                    let name = image
                        .path()
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    if ui.selectable_label(current == Some(idx), name).clicked() {
                        picked = Some(idx);
                    }
                }
            });
        if let Some(idx) = picked {
            self.select(idx, ctx);
        }
    }

    fn outputs_ui(&mut self, ui: &mut egui::Ui) {
        if let Some(crop) = &self.crop {
            ui.heading("Crop");
            let size = crop.texture.size_vec2();
            let scale = (CROP_PREVIEW_EDGE / size.x.max(size.y)).min(1.0);
            ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                crop.texture.id(),
                size * scale,
            )));
            if ui.button("Save crop").clicked() {
                self.save_crop();
            }
            ui.separator();
        }

        ui.heading(format!("Saved crops ({})", self.outputs.len()));
        ui.label(selection_summary(&self.selection));
        ui.horizontal(|ui| {
            if ui.button("Select all").clicked() {
                self.selection.select_all(self.outputs.iter().cloned());
                self.status = format!("Selected all {} files", self.selection.len());
            }
            if ui.button("Clear").clicked() {
                self.selection.clear();
                self.status = "Cleared all selections".into();
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Delete selected").clicked() {
                self.delete_selected();
            }
            if ui.button("Export zip").clicked() {
                self.export();
            }
        });

        let mut toggled = None;
        egui::ScrollArea::vertical()
            .id_salt("outputs")
            .show(ui, |ui| {
                for id in &self.outputs {
                    let selected = self.selection.contains(id);
                    let caption = if selected {
                        format!("{id} • SELECTED")
                    } else {
                        id.clone()
                    };
                    if ui.selectable_label(selected, caption).clicked() {
                        toggled = Some(id.clone());
                    }
                }
            });
        if let Some(id) = toggled {
            self.status = match self.selection.toggle(&id) {
                Toggle::Selected => format!("Selected for deletion: {id}"),
                Toggle::Deselected => format!("Deselected: {id}"),
            };
        }
    }

    fn image_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (Some(texture), Some(transform)) = (&self.texture, self.transform) else {
            ui.centered_and_justified(|ui| {
                ui.label(if self.session.is_empty() {
                    "No images loaded"
                } else {
                    "Image could not be loaded"
                });
            });
            return;
        };

        let size = egui::vec2(transform.display_size.0 as f32, transform.display_size.1 as f32);
        let mut clicked = None;
        egui::ScrollArea::both().id_salt("preview").show(ui, |ui| {
            let response = ui.add(
                egui::Image::from_texture(egui::load::SizedTexture::new(texture.id(), size))
                    .fit_to_exact_size(size)
                    .sense(egui::Sense::click()),
            );
            // Display pixels per screen point, in case the widget got squeezed.
            let ratio = response.rect.width().max(1.0) / size.x;

            if response.clicked() {
                if let Some(pointer) = response.interact_pointer_pos() {
                    let rel = (pointer - response.rect.min) / ratio;
                    clicked = Some((rel.x as f64, rel.y as f64));
                }
            }

            if let Some(crop) = &self.crop {
                let r = crop.rect;
                let to_screen = |x: u32, y: u32| {
                    response.rect.min
                        + egui::vec2(
                            (x as f64 / transform.scale_x) as f32,
                            (y as f64 / transform.scale_y) as f32,
                        ) * ratio
                };
                let marker = egui::Rect::from_min_max(
                    to_screen(r.x, r.y),
                    to_screen(r.x + r.width, r.y + r.height),
                );
                ui.painter().rect_stroke(
                    marker,
                    0.0,
                    egui::Stroke::new(2.0, Color32::YELLOW),
                    egui::StrokeKind::Outside,
                );
            }
        });

        if let Some(click) = clicked {
            self.handle_click(click, ctx);
        }
    }
}

impl App for ImagePrepApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.loader.update();

        let keys = Self::handle_keyboard(ctx);
        if keys.next_image {
            self.navigate(Direction::Next, ctx);
        }
        if keys.prev_image {
            self.navigate(Direction::Prev, ctx);
        }
        if keys.save_crop {
            self.save_crop();
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.monospace(self.status.as_str());
        });
        egui::SidePanel::left("controls").show(ctx, |ui| self.controls_ui(ui, ctx));
        egui::SidePanel::right("outputs").show(ctx, |ui| self.outputs_ui(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.image_ui(ui, ctx));
    }
}

pub fn image_status(session: &SessionState, transform: &DisplayTransform) -> String {
    let index = session.current_index().map(|i| i + 1).unwrap_or(0);
    format!(
        "Image {index} of {} - Display: {}x{}",
        session.len(),
        transform.display_size.0,
        transform.display_size.1
    )
}

pub fn crop_status(target: CropTarget, rect: CropRectangle, zoom: ZoomFactor) -> String {
    let zoom_info = if zoom.is_identity() {
        String::new()
    } else {
        format!(" (Zoom: {:.1}x)", zoom.get())
    };
    format!("Cropped: {target} from ({}, {}){zoom_info}", rect.x, rect.y)
}

pub fn selection_summary(selection: &SelectionSet) -> String {
    if selection.is_empty() {
        return "Selected (0): None".into();
    }
    let names: Vec<&str> = selection.iter().collect();
    format!("Selected ({}): {}", names.len(), names.join(", "))
}

pub fn delete_status(report: &DeleteReport) -> String {
    let names: Vec<&str> = report.deleted_ids().collect();
    let mut status = format!("Deleted {} files: {}", report.deleted(), names.join(", "));
    if report.failed() > 0 {
        status.push_str(&format!(" ({} failed)", report.failed()));
    }
    status
}
