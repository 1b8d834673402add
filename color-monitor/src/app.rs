use crate::palette::{self, Rgb};

/// Update requests posted to the display surface. The worker never touches
/// UI state directly; it only sends these, and they are applied on the UI
/// thread in the order they were sent.
#[derive(Debug, Clone, PartialEq)]
pub enum UiMessage {
    /// Connection and progress notes for the status line.
    Status { message: String },
    /// Worker-side failures, shown on the same status line.
    Error { message: String },
    /// One classified reading: display name, background code, status text.
    Reading {
        name: String,
        code: Rgb,
        status: String,
    },
}

/// Everything the display surface renders. Owned by the UI loop; all
/// mutation goes through [`App::apply`].
pub struct App {
    pub color_name: String,
    pub background: Rgb,
    pub status: String,
    pub status_is_error: bool,
    pub readings: usize,
    pub simulation_mode: bool,
    pub should_quit: bool,
    pub interrupted: bool,
}

impl App {
    pub fn new(simulation_mode: bool) -> Self {
        Self {
            color_name: "WAITING".to_string(),
            background: palette::DEFAULT_GRAY,
            status: "Connecting to color sensor...".to_string(),
            status_is_error: false,
            readings: 0,
            simulation_mode,
            should_quit: false,
            interrupted: false,
        }
    }

    pub fn apply(&mut self, msg: UiMessage) {
        match msg {
            UiMessage::Status { message } => {
                self.status = message;
                self.status_is_error = false;
            }
            UiMessage::Error { message } => {
                self.status = message;
                self.status_is_error = true;
            }
            UiMessage::Reading { name, code, status } => {
                self.color_name = name;
                self.background = code;
                self.status = status;
                self.status_is_error = false;
                self.readings += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_the_waiting_placeholder() {
        let app = App::new(false);
        assert_eq!(app.color_name, "WAITING");
        assert_eq!(app.background, palette::DEFAULT_GRAY);
        assert!(app.status.contains("Connecting"));
        assert_eq!(app.readings, 0);
    }

    #[test]
    fn readings_replace_name_background_and_status() {
        let mut app = App::new(false);
        app.apply(UiMessage::Reading {
            name: "RED".to_string(),
            code: Rgb::hex(0xFF0000),
            status: "RGB(255,0,0) - 97.5% confident".to_string(),
        });

        assert_eq!(app.color_name, "RED");
        assert_eq!(app.background, Rgb::hex(0xFF0000));
        assert!(app.status.contains("97.5"));
        assert_eq!(app.readings, 1);
    }

    #[test]
    fn status_and_errors_leave_the_color_panel_alone() {
        let mut app = App::new(false);
        app.apply(UiMessage::Reading {
            name: "BLUE".to_string(),
            code: Rgb::hex(0x0000FF),
            status: "RGB(0,0,255) - 88.0% confident".to_string(),
        });

        app.apply(UiMessage::Error {
            message: "Serial error: device unplugged".to_string(),
        });
        assert_eq!(app.color_name, "BLUE");
        assert_eq!(app.background, Rgb::hex(0x0000FF));
        assert!(app.status_is_error);
        assert_eq!(app.readings, 1);

        app.apply(UiMessage::Status {
            message: "Connected to sensor at /dev/ttyACM0".to_string(),
        });
        assert!(!app.status_is_error);
        assert_eq!(app.color_name, "BLUE");
    }

    #[test]
    fn updates_apply_in_the_order_they_were_posted() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let worker = std::thread::spawn(move || {
            for i in 0..200 {
                tx.send(UiMessage::Status {
                    message: format!("update {i}"),
                })
                .unwrap();
            }
        });
        worker.join().unwrap();

        let mut app = App::new(false);
        let mut seen = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            if let UiMessage::Status { message } = &msg {
                seen.push(message.clone());
            }
            app.apply(msg);
        }

        let expected: Vec<String> = (0..200).map(|i| format!("update {i}")).collect();
        assert_eq!(seen, expected);
        assert_eq!(app.status, "update 199");
    }
}
