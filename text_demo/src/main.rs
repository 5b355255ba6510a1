//! Text and GUI demo application
//!
//! Opens a window, types out a word-wrapped paragraph, and shows two
//! buttons: one plays a sound from the `demo` domain, the other quits.
//! Arrow keys, WASD or a joystick light up the direction readout.
//! F11 toggles fullscreen and Escape closes the window.

use glfw::WindowEvent;
use rust_gamekit::prelude::*;
use rust_gamekit::audio::create_backend;
use rust_gamekit::resources::SoundId;

const CONFIG_PATH: &str = "text_demo.toml";
const FALLBACK_FONT: &str = "assets/static/fonts/mono.ttf";
const BEEP_SOUND: &str = "beep.wav";

const ACTION_BEEP: u32 = 1;
const ACTION_QUIT: u32 = 2;

/// Characters revealed per second by the typewriter paragraph
const TYPE_SPEED: f64 = 30.0;

pub struct TextDemoApp {
    // Dropped before the window so GL objects go while the context lives
    renderer: Renderer<GlBackend>,
    resources: ResourceManager,
    font: FontConfig,
    screen: GuiScreen,
    controllers: ControllerManager,
    beep: Option<SoundId>,
    start_time: f64,
    window: Window,
}

impl TextDemoApp {
    pub fn new(config: &KitConfig) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Creating text demo application...");
        let mut window = Window::create(&config.window)?;

        let (width, height) = window.framebuffer_size();
        let gfx = GlBackend::from_loader(|name| window.get_proc_address(name), width, height)?;
        let renderer = Renderer::new(gfx);

        let font_path = config.font.path.as_deref().unwrap_or(FALLBACK_FONT);
        let font = TruetypeFont::with_height(font_path, config.font.height_to_load)?.shared();
        let font = FontConfig::new(font).with_color(color::white());

        let mut resources = ResourceManager::new(&config.domain, create_backend(&config.audio));
        resources.set_default_gain(config.audio.default_gain);

        let start_time = window.time();
        Ok(Self {
            renderer,
            resources,
            font,
            screen: GuiScreen::new(),
            controllers: ControllerManager::new(),
            beep: None,
            start_time,
            window,
        })
    }

    pub fn initialize(&mut self) {
        log::info!("Initializing text demo...");

        // A missing sound only silences the beep button
        match self.resources.load(BEEP_SOUND, None) {
            Ok(id) => self.beep = Some(id),
            Err(e) => log::warn!("Beep sound unavailable: {}", e),
        }

        let label = self.font.with_centered(true).with_stroke(color::black());
        self.screen.add(
            GuiBackground::new(0, Vec2f::new(-0.95, -0.95), Vec2f::new(1.9, 0.5), color::grayscale(0.15))
                .with_stroke(color::grayscale(0.6)),
        );
        self.screen.add(
            GuiButton::new(1, Vec2f::new(-0.85, -0.85), Vec2f::new(0.6, 0.3), ACTION_BEEP)
                .with_label("Beep", 0.1, label.clone()),
        );
        self.screen.add(
            GuiButton::new(1, Vec2f::new(0.25, -0.85), Vec2f::new(0.6, 0.3), ACTION_QUIT)
                .with_fill(Color::new(0.5, 0.1, 0.1, 1.0))
                .with_label("Quit", 0.1, label),
        );
        self.screen.add(GuiText::new(
            2,
            Vec2f::new(-0.9, 0.85),
            0.08,
            "rust_gamekit text demo",
            self.font.with_underline(true),
        ));
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.initialize();
        log::info!("Entering main loop");

        while !self.window.should_close() {
            self.window.input_mut().update();
            for event in self.window.poll_events() {
                if let WindowEvent::FramebufferSize(width, height) = event {
                    log::debug!("Framebuffer resized to {}x{}", width, height);
                    self.renderer
                        .backend_mut()
                        .set_viewport(width.max(0) as u32, height.max(0) as u32);
                }
            }

            self.handle_input()?;
            self.resources.update();
            self.screen.update();
            self.render_frame();
            self.window.swap_buffers();
        }

        Ok(())
    }

    fn handle_input(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.window.input().is_key_pressed(KeyCode::Escape) {
            self.window.set_should_close(true);
        }
        if self.window.input().is_key_pressed(KeyCode::F11) {
            let fullscreen = !self.window.is_fullscreen();
            log::info!("Fullscreen: {}", fullscreen);
            self.window.set_fullscreen(fullscreen);
        }

        let joystick = self.window.joystick();
        self.controllers.update(self.window.input(), &joystick);

        for action in self.screen.dispatch_clicks(self.window.input_mut()) {
            match action {
                ACTION_BEEP => {
                    if let Some(id) = self.beep {
                        self.resources.stop(id)?;
                        self.resources.play(id)?;
                    }
                }
                ACTION_QUIT => self.window.set_should_close(true),
                other => log::warn!("Unhandled GUI action {}", other),
            }
        }
        Ok(())
    }

    fn render_frame(&mut self) {
        self.renderer.clear_screen(color::grayscale(0.05));

        let elapsed = self.window.time() - self.start_time;
        let paragraph = TextUnits::new(
            "The quick brown fox jumps over the lazy dog. ",
            Vec2f::new(-0.9, 0.6),
            0.07,
            self.font.clone(),
        )
        .chain_with(
            "Outlined words wrap with the rest ",
            0.07,
            self.font.with_color(Color::new(1.0, 0.8, 0.2, 1.0)).with_stroke(color::black()),
        )
        .chain("and the chain keeps its anchor.")
        .br()
        .chain("Press F11 for fullscreen.");
        let budget = (elapsed * TYPE_SPEED) as usize;
        self.renderer.render_text_units(1.8, &paragraph, budget);

        let directions: Vec<String> = self
            .controllers
            .directions()
            .iter()
            .map(|d| format!("{:?}", d))
            .collect();
        let readout = format!("Direction: {}", directions.join(" "));
        self.renderer
            .render_string(&readout, Vec2f::new(-0.9, -0.2), 0.06, &self.font);

        self.screen.render(&mut self.renderer);
    }

    /// Release GPU and audio resources while the context is current
    pub fn shutdown(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Shutting down text demo...");
        self.resources.close(self.renderer.backend_mut())?;
        self.font.font().borrow_mut().close(self.renderer.backend_mut())?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC occurred!");
        if let Some(location) = panic_info.location() {
            eprintln!("Panic location: {}:{}", location.file(), location.line());
        }
        if let Some(payload) = panic_info.payload().downcast_ref::<&str>() {
            eprintln!("Panic message: {}", payload);
        } else if let Some(payload) = panic_info.payload().downcast_ref::<String>() {
            eprintln!("Panic message: {}", payload);
        }
    }));

    rust_gamekit::foundation::logging::init_with_default("info");
    log::info!("Starting text demo");

    let config = KitConfig::load_or_default(CONFIG_PATH)?;
    let mut app = TextDemoApp::new(&config)?;

    let result = app.run();
    if let Err(e) = app.shutdown() {
        log::error!("Shutdown error: {}", e);
    }

    match result {
        Ok(()) => {
            log::info!("Text demo finished successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Application error: {}", e);
            Err(e)
        }
    }
}
