use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h2>{"Deepfake Detection"}</h2>
        </header>
    }
}
