use super::super::Model;
use yew::prelude::*;

pub fn render_results(model: &Model) -> Html {
    let Some(result) = &model.result else {
        return html! {};
    };

    let colour = if result.deepfake_probability > 0.5 {
        "red"
    } else {
        "green"
    };

    html! {
        <div
            class="results-container"
            style="border: 1px solid #ccc; padding: 20px; width: 420px; background: #f9f9f9;"
        >
            <p><b>{"Type:"}</b>{" "}{ result.kind.to_string() }</p>
            <p>
                <b>{"Result:"}</b>{" "}
                <span style={format!("color: {}; font-weight: bold;", colour)}>
                    { result.result.clone() }
                </span>
            </p>
            <p><b>{"Confidence:"}</b>{" "}{ format!("{}", result.deepfake_probability) }</p>
        </div>
    }
}
