use clap::Parser;
use std::path::PathBuf;

use skyframe::config::Config;

#[derive(Parser, Debug)]
#[command(name = "skyframe")]
#[command(version)]
#[command(about = "Weather and clock LED matrix, previewed in a desktop window", long_about = None)]
pub struct Args {
    /// JSON config file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "skyframe.json")]
    pub config: PathBuf,

    /// Write the effective config back to the config file and exit
    #[arg(long)]
    pub write_config: bool,

    /// Panel size as WxH, e.g. 64x32
    #[arg(short = 'p', long, value_parser = parse_size)]
    pub panel: Option<(u32, u32)>,

    /// Quarter turns applied to everything drawn (0-3)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..4))]
    pub rotation: Option<u8>,

    /// Panel brightness (0-255)
    #[arg(short, long)]
    pub brightness: Option<u8>,

    /// Window pixels per panel pixel
    #[arg(short, long)]
    pub scale: Option<u32>,

    /// Disable VSync
    #[arg(long)]
    pub no_vsync: bool,

    /// Frame rate cap, 0 for none
    #[arg(long)]
    pub max_fps: Option<u32>,

    /// MQTT broker host
    #[arg(long)]
    pub host: Option<String>,

    /// MQTT broker port
    #[arg(long)]
    pub port: Option<u16>,

    /// MQTT topic carrying OpenWeather JSON
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Skip the broker and show a built-in sample observation
    #[arg(long)]
    pub simulate: bool,

    /// Unix socket for remote control
    #[arg(long)]
    pub socket: Option<PathBuf>,
}

impl Args {
    /// Overlay command-line values on a loaded config
    pub fn apply(&self, config: &mut Config) {
        if let Some((width, height)) = self.panel {
            config.panel.width = width;
            config.panel.height = height;
        }
        if let Some(rotation) = self.rotation {
            config.panel.rotation = rotation;
        }
        if let Some(brightness) = self.brightness {
            config.panel.brightness = brightness;
        }
        if let Some(scale) = self.scale {
            config.window.scale = scale;
        }
        if self.no_vsync {
            config.window.vsync = false;
        }
        if let Some(max_fps) = self.max_fps {
            config.max_fps = max_fps;
        }
        if let Some(host) = &self.host {
            config.feed.host = host.clone();
        }
        if let Some(port) = self.port {
            config.feed.port = port;
        }
        if let Some(topic) = &self.topic {
            config.feed.topic = topic.clone();
        }
        if let Some(socket) = &self.socket {
            config.control_socket = socket.clone();
        }
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {:?}", s))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width: {}", e))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height: {}", e))?;
    if w == 0 || h == 0 {
        return Err("panel dimensions must be non-zero".to_string());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("64x32"), Ok((64, 32)));
        assert_eq!(parse_size("128X64"), Ok((128, 64)));
        assert!(parse_size("64").is_err());
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("ax10").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "skyframe",
            "--panel",
            "32x16",
            "--rotation",
            "3",
            "--no-vsync",
            "--host",
            "broker.lan",
        ]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!((config.panel.width, config.panel.height), (32, 16));
        assert_eq!(config.panel.rotation, 3);
        assert!(!config.window.vsync);
        assert_eq!(config.feed.host, "broker.lan");
        // Untouched values keep the config's
        assert_eq!(config.panel.brightness, 255);
        assert_eq!(config.feed.port, 1883);
    }

    #[test]
    fn test_rotation_range_checked() {
        assert!(Args::try_parse_from(["skyframe", "--rotation", "4"]).is_err());
    }
}
