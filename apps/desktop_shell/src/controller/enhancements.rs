//! Cosmetic styling injected once the page has loaded.

pub const ENHANCEMENT_CSS: &str = r#"
::-webkit-scrollbar { width: 10px; height: 10px; }
::-webkit-scrollbar-track { background: rgba(0, 0, 0, 0.1); border-radius: 5px; }
::-webkit-scrollbar-thumb {
  background: linear-gradient(180deg, #667eea 0%, #764ba2 100%);
  border-radius: 5px;
}
button, .btn {
  border-radius: 8px;
  font-weight: 500;
  transition: transform 0.2s ease, box-shadow 0.2s ease;
}
button:hover, .btn:hover { transform: translateY(-1px); }
input, textarea, select { border-radius: 8px; border: 1px solid rgba(0, 0, 0, 0.1); }
input:focus, textarea:focus, select:focus {
  border-color: #667eea;
  box-shadow: 0 0 0 3px rgba(102, 126, 234, 0.1);
  outline: none;
}
body { -webkit-font-smoothing: antialiased; }
"#;

const STYLE_ELEMENT_ID: &str = "rflow-shell-enhancements";

/// Script that adds [`ENHANCEMENT_CSS`] to the page. Running it twice is harmless.
pub fn enhancement_script() -> String {
    let css = ENHANCEMENT_CSS
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${");
    format!(
        "(function() {{\n\
         if (document.getElementById('{STYLE_ELEMENT_ID}')) {{ return; }}\n\
         var style = document.createElement('style');\n\
         style.id = '{STYLE_ELEMENT_ID}';\n\
         style.textContent = `{css}`;\n\
         document.head.appendChild(style);\n\
         }})();"
    )
}
