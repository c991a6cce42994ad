//! Engine preference struct and how the window's options override it

use crate::config::WebPreferencesConfig;

/// Rendering-engine preferences for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPreferences {
    /// JavaScript execution
    pub javascript_enabled: bool,
    /// Same-origin policy
    pub web_security_enabled: bool,
    /// Image loading
    pub images_enabled: bool,
    /// Java applets
    pub java_enabled: bool,
    /// Resizable text areas
    pub text_areas_are_resizable: bool,
    /// WebGL
    pub experimental_webgl_enabled: bool,
    /// Web Audio
    pub webaudio_enabled: bool,
    /// Plugins
    pub plugins_enabled: bool,
}

impl Default for WebPreferences {
    fn default() -> Self {
        Self {
            javascript_enabled: true,
            web_security_enabled: true,
            images_enabled: true,
            java_enabled: true,
            text_areas_are_resizable: true,
            experimental_webgl_enabled: true,
            webaudio_enabled: true,
            plugins_enabled: true,
        }
    }
}

impl WebPreferences {
    /// Copy every explicitly configured toggle onto these preferences
    pub fn apply(&mut self, config: &WebPreferencesConfig) {
        let overrides = [
            (config.javascript, &mut self.javascript_enabled),
            (config.web_security, &mut self.web_security_enabled),
            (config.images, &mut self.images_enabled),
            (config.java, &mut self.java_enabled),
            (config.text_areas_are_resizable, &mut self.text_areas_are_resizable),
            (config.webgl, &mut self.experimental_webgl_enabled),
            (config.webaudio, &mut self.webaudio_enabled),
            (config.plugins, &mut self.plugins_enabled),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}
