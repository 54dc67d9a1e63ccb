use super::super::Model;
use super::super::Msg;
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_change = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().and_then(|files| files.get(0));
        Msg::FileSelected(file)
    });

    html! {
        <div class="upload-section">
            <input
                type="file"
                accept="image/*,video/*"
                onchange={handle_change}
            />

            <br /><br />

            <button
                class="analyze-btn"
                onclick={link.callback(|_| Msg::Analyze)}
                disabled={model.loading}
            >
                { if model.loading { "Analyzing..." } else { "Analyze" } }
            </button>
        </div>
    }
}
